//! link_clicks 的写入与存在性检查

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::click_to_active_model;
use crate::errors::{LinkTrackerError, Result};
use crate::storage::ClickEvent;

use migration::entities::link_click;
use migration::SchemaManager;

/// SQLite 单条语句的绑定参数上限较低，按批插入
const INSERT_CHUNK: usize = 50;

pub(super) async fn insert_clicks_on<C: ConnectionTrait>(conn: &C, clicks: &[ClickEvent]) -> Result<()> {
    for chunk in clicks.chunks(INSERT_CHUNK) {
        let models: Vec<link_click::ActiveModel> = chunk.iter().map(click_to_active_model).collect();
        link_click::Entity::insert_many(models)
            .exec(conn)
            .await
            .map_err(|e| LinkTrackerError::database_operation(format!("批量插入点击失败: {}", e)))?;
    }
    Ok(())
}

impl SeaOrmStorage {
    /// link_clicks 表是否存在；查询失败视为不存在
    pub async fn click_table_exists(&self) -> bool {
        SchemaManager::new(&self.db)
            .has_table("link_clicks")
            .await
            .unwrap_or(false)
    }

    pub async fn insert_click(&self, click: &ClickEvent) -> Result<()> {
        link_click::Entity::insert(click_to_active_model(click))
            .exec(&self.db)
            .await
            .map_err(|e| LinkTrackerError::database_operation(format!("写入点击失败: {}", e)))?;
        debug!(
            "Click recorded: link_id={} visitor={}",
            click.link_id, click.visitor_id
        );
        Ok(())
    }

    /// 批量写入点击，不更新链接计数器
    ///
    /// 只用于导入已有数据或准备测试数据；正常跳转走 `insert_click`
    pub async fn insert_clicks(&self, clicks: &[ClickEvent]) -> Result<()> {
        insert_clicks_on(&self.db, clicks).await
    }

    /// 该访客此前是否点击过该链接
    pub async fn visitor_has_clicked(&self, link_id: i64, visitor_id: &str) -> Result<bool> {
        let count = link_click::Entity::find()
            .filter(link_click::Column::LinkId.eq(link_id))
            .filter(link_click::Column::VisitorId.eq(visitor_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
