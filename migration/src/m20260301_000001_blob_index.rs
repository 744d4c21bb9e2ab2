use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 blobs 表（内容摘要 -> 存储位置）
        manager
            .create_table(
                Table::create()
                    .table(Blob::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Blob::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Blob::Hash).string_len(64).not_null())
                    .col(ColumnDef::new(Blob::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Blob::Size).big_integer().not_null())
                    .col(
                        ColumnDef::new(Blob::AccessCount)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Blob::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Blob::AccessedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 去重依赖 hash 唯一约束，并发写入的败者在这里被拒绝
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_blobs_hash")
                    .table(Blob::Table)
                    .col(Blob::Hash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_blobs_location")
                    .table(Blob::Table)
                    .col(Blob::Location)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_blobs_location").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("uq_blobs_hash").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Blob::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Blob {
    #[sea_orm(iden = "blobs")]
    Table,
    Id,
    Hash,
    Location,
    Size,
    AccessCount,
    CreatedAt,
    AccessedAt,
}
