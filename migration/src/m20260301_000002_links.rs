use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 links 表
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::ShortCode).string_len(32).not_null())
                    .col(ColumnDef::new(Link::BlobLocation).string_len(255).not_null())
                    .col(ColumnDef::new(Link::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Link::Visibility)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Link::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 短码全局唯一，生成器的读后写检查以此为最终兜底
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_links_short_code")
                    .table(Link::Table)
                    .col(Link::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_created")
                    .table(Link::Table)
                    .col(Link::OwnerId)
                    .col(Link::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_expires_at")
                    .table(Link::Table)
                    .col(Link::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_expires_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_owner_created").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("uq_links_short_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    ShortCode,
    BlobLocation,
    OwnerId,
    Visibility,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
