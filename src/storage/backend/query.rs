//! Link read operations

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::Order,
};
use tracing::debug;

use super::converters::model_to_link;
use super::{SeaOrmStorage, map_db_err};
use crate::errors::Result;
use crate::storage::{Link, LinkPage, LinkQuery, LinkSortField, SortOrder};

use migration::entities::link;

impl SeaOrmStorage {
    pub async fn find_link_by_id(&self, id: &str) -> Result<Option<Link>> {
        let model = link::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| map_db_err("find link by id", e))?;
        Ok(model.map(model_to_link))
    }

    pub async fn find_link_by_code(&self, code: &str) -> Result<Option<Link>> {
        let model = link::Entity::find()
            .filter(link::Column::ShortCode.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| map_db_err("find link by code", e))?;
        Ok(model.map(model_to_link))
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        let count = link::Entity::find()
            .filter(link::Column::ShortCode.eq(code))
            .count(&self.db)
            .await
            .map_err(|e| map_db_err("check short code", e))?;
        Ok(count > 0)
    }

    /// 分页列出链接（可按用户过滤）
    pub async fn list_links(&self, query: &LinkQuery) -> Result<LinkPage<Link>> {
        query.validate()?;

        let mut condition = Condition::all();
        if let Some(ref owner_id) = query.owner_id {
            condition = condition.add(link::Column::OwnerId.eq(owner_id.as_str()));
        }

        let column = match query.sort_by {
            LinkSortField::CreatedAt => link::Column::CreatedAt,
            LinkSortField::UpdatedAt => link::Column::UpdatedAt,
            LinkSortField::ExpiresAt => link::Column::ExpiresAt,
            LinkSortField::ShortCode => link::Column::ShortCode,
        };
        let order = match query.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let paginator = link::Entity::find()
            .filter(condition)
            .order_by(column, order)
            // 排序字段相同时按 id 保持稳定
            .order_by(link::Column::Id, Order::Asc)
            .paginate(&self.db, query.page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_db_err("count links", e))?;
        let models = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| map_db_err("list links", e))?;

        debug!(
            "Listed {} of {} links (page {}, size {})",
            models.len(),
            total,
            query.page,
            query.page_size
        );

        Ok(LinkPage {
            items: models.into_iter().map(model_to_link).collect(),
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }
}
