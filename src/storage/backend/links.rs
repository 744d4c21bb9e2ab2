//! Link mutations
//!
//! Owner-scoped writes filter on `(id, owner_id)` in the same statement, so
//! an ownership mismatch and a missing row are indistinguishable here too.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr,
};
use tracing::info;

use super::converters::model_to_link;
use super::{SeaOrmStorage, map_db_err};
use crate::errors::Result;
use crate::storage::{Link, LinkChanges, NewLink};

use migration::entities::link;

impl SeaOrmStorage {
    /// 插入新链接；short_code 冲突时返回 `Conflict`
    pub async fn insert_link(&self, new: NewLink) -> Result<Link> {
        let now = Utc::now();
        let active = link::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            short_code: Set(new.short_code),
            blob_location: Set(new.blob_location),
            owner_id: Set(new.owner_id),
            visibility: Set(new.visibility),
            expires_at: Set(new.expires_at),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| map_db_err("insert link", e))?;
        info!("Link inserted: {} ({})", model.short_code, model.id);
        Ok(model_to_link(model))
    }

    /// 仅当 `owner_id` 匹配时更新；返回更新后的链接，未命中返回 `None`
    pub async fn update_link_owned(
        &self,
        id: &str,
        owner_id: &str,
        changes: LinkChanges,
    ) -> Result<Option<Link>> {
        let mut update = link::Entity::update_many()
            .col_expr(link::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(location) = changes.blob_location {
            update = update.col_expr(link::Column::BlobLocation, Expr::value(location));
        }
        if let Some(visibility) = changes.visibility {
            update = update.col_expr(link::Column::Visibility, Expr::value(visibility));
        }
        if let Some(expires_at) = changes.expires_at {
            update = update.col_expr(link::Column::ExpiresAt, Expr::value(expires_at));
        }

        let result = update
            .filter(link::Column::Id.eq(id))
            .filter(link::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err("update link", e))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        info!("Link updated: {}", id);
        self.find_link_by_id(id).await
    }

    /// 仅当 `owner_id` 匹配时删除；只删链接行，引用的 Blob 保留
    pub async fn delete_link_owned(&self, id: &str, owner_id: &str) -> Result<bool> {
        let result = link::Entity::delete_many()
            .filter(link::Column::Id.eq(id))
            .filter(link::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err("delete link", e))?;

        if result.rows_affected > 0 {
            info!("Link deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }
}
