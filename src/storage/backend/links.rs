//! tracked_links 的读写

use chrono::NaiveDateTime;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{model_to_tracked_link, new_link_to_active_model};
use crate::errors::{LinkTrackerError, Result};
use crate::storage::{LinkStatus, NewLink, TrackedLink};

use migration::entities::tracked_link;

/// 插入新链接（可在事务内调用）
pub(super) async fn insert_link_on<C: ConnectionTrait>(
    conn: &C,
    link: &NewLink,
    now: NaiveDateTime,
) -> Result<TrackedLink> {
    let model = new_link_to_active_model(link, now)
        .insert(conn)
        .await
        .map_err(|e| LinkTrackerError::database_operation(format!("插入链接失败: {}", e)))?;
    Ok(model_to_tracked_link(model))
}

pub(super) async fn short_code_exists_on<C: ConnectionTrait>(conn: &C, code: &str) -> Result<bool> {
    let count = tracked_link::Entity::find()
        .filter(tracked_link::Column::ShortCode.eq(code))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub(super) async fn published_links_on<C: ConnectionTrait>(
    conn: &C,
    limit: Option<u64>,
) -> Result<Vec<TrackedLink>> {
    let models = tracked_link::Entity::find()
        .filter(tracked_link::Column::Status.eq(LinkStatus::Publish.as_ref()))
        .order_by_asc(tracked_link::Column::Id)
        .limit(limit)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(model_to_tracked_link).collect())
}

impl SeaOrmStorage {
    pub async fn insert_link(&self, link: &NewLink, now: NaiveDateTime) -> Result<TrackedLink> {
        let created = insert_link_on(&self.db, link, now).await?;
        info!(
            "Tracked link created: id={} code={}",
            created.id, created.short_code
        );
        Ok(created)
    }

    pub async fn short_code_exists(&self, code: &str) -> Result<bool> {
        short_code_exists_on(&self.db, code).await
    }

    pub async fn find_link(&self, id: i64) -> Result<Option<TrackedLink>> {
        let model = tracked_link::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_tracked_link))
    }

    pub async fn find_link_by_code(&self, code: &str) -> Result<Option<TrackedLink>> {
        let model = tracked_link::Entity::find()
            .filter(tracked_link::Column::ShortCode.eq(code))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_tracked_link))
    }

    pub async fn find_links_by_ids(&self, ids: &[i64]) -> Result<Vec<TrackedLink>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = tracked_link::Entity::find()
            .filter(tracked_link::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_tracked_link).collect())
    }

    /// 已发布链接，按 id 升序
    pub async fn published_links(&self, limit: Option<u64>) -> Result<Vec<TrackedLink>> {
        published_links_on(&self.db, limit).await
    }

    /// 列出链接，最新的在前
    pub async fn list_links(&self, status: Option<LinkStatus>) -> Result<Vec<TrackedLink>> {
        let mut query = tracked_link::Entity::find();
        if let Some(status) = status {
            query = query.filter(tracked_link::Column::Status.eq(status.as_ref()));
        }
        let models = query
            .order_by_desc(tracked_link::Column::CreatedAt)
            .order_by_desc(tracked_link::Column::Id)
            .all(&self.db)
            .await?;
        debug!("list_links returned {} links", models.len());
        Ok(models.into_iter().map(model_to_tracked_link).collect())
    }

    /// 删除链接；点击记录保留
    pub async fn delete_link(&self, id: i64) -> Result<bool> {
        let result = tracked_link::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LinkTrackerError::database_operation(format!("删除链接失败: {}", e)))?;
        Ok(result.rows_affected > 0)
    }

    /// 原子地递增计数器：total_clicks + 1，新访客时 unique_visitors + 1
    pub async fn bump_link_counters(&self, link_id: i64, new_visitor: bool) -> Result<()> {
        let mut update = tracked_link::Entity::update_many().col_expr(
            tracked_link::Column::TotalClicks,
            Expr::col(tracked_link::Column::TotalClicks).add(1),
        );
        if new_visitor {
            update = update.col_expr(
                tracked_link::Column::UniqueVisitors,
                Expr::col(tracked_link::Column::UniqueVisitors).add(1),
            );
        }
        update
            .filter(tracked_link::Column::Id.eq(link_id))
            .exec(&self.db)
            .await
            .map_err(|e| LinkTrackerError::database_operation(format!("更新计数失败: {}", e)))?;
        Ok(())
    }
}
