//! 演示数据重置：清空点击表并写入生成的数据，全部在一个事务内完成

use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::Expr,
};
use tracing::{info, warn};

use super::SeaOrmStorage;
use super::clicks::insert_clicks_on;
use super::links::{insert_link_on, published_links_on};
use super::reports::{ClickScope, SummaryRow};
use crate::errors::{LinkTrackerError, Result};
use crate::storage::{ClickEvent, NewLink, ResetOutcome, TrackedLink};

use migration::entities::{link_click, tracked_link};

impl SeaOrmStorage {
    /// 清空 link_clicks，并为每个已发布链接写入 `generate` 生成的点击
    ///
    /// 没有已发布链接时先插入 `sample`。最后按点击表重算每个链接的
    /// total_clicks / unique_visitors。任一步失败整体回滚。
    pub async fn reset_clicks_with<F>(
        &self,
        sample: NewLink,
        now: NaiveDateTime,
        generate: F,
    ) -> Result<ResetOutcome>
    where
        F: FnOnce(&[TrackedLink]) -> Vec<ClickEvent>,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LinkTrackerError::database_operation(format!("开始事务失败: {}", e)))?;

        match Self::reset_in_txn(&txn, sample, now, generate).await {
            Ok(outcome) => {
                txn.commit().await.map_err(|e| {
                    LinkTrackerError::database_operation(format!("提交事务失败: {}", e))
                })?;
                info!(
                    "Click data reset: {} clicks across {} links",
                    outcome.total_clicks,
                    outcome.links.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback after failed reset also failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn reset_in_txn<F>(
        txn: &DatabaseTransaction,
        sample: NewLink,
        now: NaiveDateTime,
        generate: F,
    ) -> Result<ResetOutcome>
    where
        F: FnOnce(&[TrackedLink]) -> Vec<ClickEvent>,
    {
        link_click::Entity::delete_many()
            .exec(txn)
            .await
            .map_err(|e| LinkTrackerError::database_operation(format!("清空点击表失败: {}", e)))?;

        let mut links = published_links_on(txn, None).await?;
        if links.is_empty() {
            links.push(insert_link_on(txn, &sample, now).await?);
        }

        let clicks = generate(&links);
        insert_clicks_on(txn, &clicks).await?;

        for link in links.iter_mut() {
            let totals = Self::summary_query(&ClickScope::link(link.id))
                .into_model::<SummaryRow>()
                .one(txn)
                .await?
                .unwrap_or_default();

            tracked_link::Entity::update_many()
                .col_expr(
                    tracked_link::Column::TotalClicks,
                    Expr::value(totals.total_clicks),
                )
                .col_expr(
                    tracked_link::Column::UniqueVisitors,
                    Expr::value(totals.unique_visitors),
                )
                .filter(tracked_link::Column::Id.eq(link.id))
                .exec(txn)
                .await
                .map_err(|e| {
                    LinkTrackerError::database_operation(format!("更新链接计数失败: {}", e))
                })?;

            link.total_clicks = totals.total_clicks;
            link.unique_visitors = totals.unique_visitors;
        }

        Ok(ResetOutcome {
            links,
            total_clicks: clicks.len(),
        })
    }
}
