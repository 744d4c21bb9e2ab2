//! Blob index operations

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter,
    sea_query::Expr,
};
use tracing::{debug, info};

use super::converters::model_to_blob;
use super::{SeaOrmStorage, map_db_err};
use crate::errors::Result;
use crate::storage::{Blob, NewBlob};

use migration::entities::blob;

impl SeaOrmStorage {
    pub async fn find_blob_by_hash(&self, hash: &str) -> Result<Option<Blob>> {
        let model = blob::Entity::find()
            .filter(blob::Column::Hash.eq(hash))
            .one(&self.db)
            .await
            .map_err(|e| map_db_err("find blob by hash", e))?;
        Ok(model.map(model_to_blob))
    }

    pub async fn find_blob_by_location(&self, location: &str) -> Result<Option<Blob>> {
        let model = blob::Entity::find()
            .filter(blob::Column::Location.eq(location))
            .one(&self.db)
            .await
            .map_err(|e| map_db_err("find blob by location", e))?;
        Ok(model.map(model_to_blob))
    }

    /// 插入新 Blob，access_count 从 1 开始
    ///
    /// hash 已存在时返回 `Conflict`（并发写入的败者）。
    pub async fn insert_blob(&self, new: NewBlob) -> Result<Blob> {
        let now = Utc::now();
        let active = blob::ActiveModel {
            hash: Set(new.hash),
            location: Set(new.location),
            size: Set(new.size as i64),
            access_count: Set(1),
            created_at: Set(now),
            accessed_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| map_db_err("insert blob", e))?;
        info!("Blob indexed: {} -> {}", model.hash, model.location);
        Ok(model_to_blob(model))
    }

    /// 复用已有 Blob：access_count + 1，刷新 accessed_at
    ///
    /// 返回是否命中一行。
    pub async fn touch_blob(&self, hash: &str) -> Result<bool> {
        let result = blob::Entity::update_many()
            .col_expr(
                blob::Column::AccessCount,
                Expr::col(blob::Column::AccessCount).add(1),
            )
            .col_expr(blob::Column::AccessedAt, Expr::value(Utc::now()))
            .filter(blob::Column::Hash.eq(hash))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err("touch blob", e))?;
        Ok(result.rows_affected > 0)
    }

    /// 删除失效的索引记录（对象已不存在）
    pub async fn delete_blob_by_hash(&self, hash: &str) -> Result<bool> {
        let result = blob::Entity::delete_many()
            .filter(blob::Column::Hash.eq(hash))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err("delete blob", e))?;
        if result.rows_affected > 0 {
            debug!("Stale blob index entry removed: {}", hash);
        }
        Ok(result.rows_affected > 0)
    }
}
