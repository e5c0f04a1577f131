//! 报表查询
//!
//! 所有查询都基于 link_clicks 实时聚合，由 `ClickScope` 限定日期窗口和链接。

use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait, Select,
};

use super::SeaOrmStorage;
use crate::analytics::DateRange;
use crate::errors::Result;

use migration::entities::{link_click, tracked_link};

// ============ 查询结果类型 ============

#[derive(Debug, Default, Clone, FromQueryResult)]
pub struct SummaryRow {
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub active_links: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct DateCountRow {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct LabelCountRow {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct ReferrerRow {
    pub referrer: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct LinkCountRow {
    pub link_id: i64,
    pub clicks: i64,
    pub unique_visitors: i64,
}

// ============ 查询范围 ============

/// 点击查询的范围：可选日期窗口 + 可选链接
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickScope {
    pub range: Option<DateRange>,
    pub link_id: Option<i64>,
}

impl ClickScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn range(range: DateRange) -> Self {
        Self {
            range: Some(range),
            link_id: None,
        }
    }

    pub fn link(link_id: i64) -> Self {
        Self {
            range: None,
            link_id: Some(link_id),
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    fn select(&self) -> Select<link_click::Entity> {
        let mut query = link_click::Entity::find();
        if let Some(range) = &self.range {
            query = query
                .filter(link_click::Column::ClickedAt.gte(range.window_start()))
                .filter(link_click::Column::ClickedAt.lt(range.window_end()));
        }
        if let Some(link_id) = self.link_id {
            query = query.filter(link_click::Column::LinkId.eq(link_id));
        }
        query
    }
}

/// 可做分组统计的维度列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    DeviceType,
    Browser,
    Os,
}

impl Dimension {
    fn column(self) -> link_click::Column {
        match self {
            Dimension::DeviceType => link_click::Column::DeviceType,
            Dimension::Browser => link_click::Column::Browser,
            Dimension::Os => link_click::Column::Os,
        }
    }
}

/// 按天分组的日期表达式（YYYY-MM-DD）
pub fn day_expr(backend: DbBackend) -> Expr {
    match backend {
        DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', clicked_at)"),
        DbBackend::MySql => Expr::cust("DATE_FORMAT(clicked_at, '%Y-%m-%d')"),
        _ => Expr::cust("TO_CHAR(clicked_at, 'YYYY-MM-DD')"),
    }
}

// ============ SeaOrmStorage 报表方法 ============

impl SeaOrmStorage {
    pub(super) fn summary_query(scope: &ClickScope) -> Select<link_click::Entity> {
        scope
            .select()
            .select_only()
            .column_as(link_click::Column::Id.count(), "total_clicks")
            .column_as(Expr::cust("COUNT(DISTINCT visitor_id)"), "unique_visitors")
            .column_as(Expr::cust("COUNT(DISTINCT link_id)"), "active_links")
    }

    /// 总点击、独立访客、有点击的链接数
    pub async fn click_summary(&self, scope: ClickScope) -> Result<SummaryRow> {
        let row = Self::summary_query(&scope)
            .into_model::<SummaryRow>()
            .one(&self.db)
            .await?;
        Ok(row.unwrap_or_default())
    }

    /// 汇总查询渲染成 SQL 文本（调试用）
    pub fn click_summary_sql(&self, scope: ClickScope) -> String {
        Self::summary_query(&scope)
            .build(self.db_backend())
            .to_string()
    }

    /// 按天分组的点击数，日期升序
    pub async fn clicks_by_day(&self, scope: ClickScope) -> Result<Vec<DateCountRow>> {
        let date_expr = day_expr(self.db_backend());
        let rows = scope
            .select()
            .select_only()
            .column_as(date_expr.clone(), "label")
            .column_as(link_click::Column::Id.count(), "count")
            .group_by(date_expr)
            .order_by_asc(Expr::cust("label"))
            .into_model::<DateCountRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// 按链接分组的点击数，点击多的在前
    ///
    /// `existing_only` 时，已删除链接留下的点击不参与排名
    pub async fn link_click_counts(
        &self,
        scope: ClickScope,
        existing_only: bool,
        limit: u64,
    ) -> Result<Vec<LinkCountRow>> {
        let mut query = scope.select();
        if existing_only {
            let existing_ids = Query::select()
                .column(tracked_link::Column::Id)
                .from(tracked_link::Entity)
                .to_owned();
            query = query.filter(link_click::Column::LinkId.in_subquery(existing_ids));
        }

        let rows = query
            .select_only()
            .column(link_click::Column::LinkId)
            .column_as(link_click::Column::Id.count(), "clicks")
            .column_as(Expr::cust("COUNT(DISTINCT visitor_id)"), "unique_visitors")
            .group_by(link_click::Column::LinkId)
            .order_by_desc(Expr::cust("clicks"))
            .order_by_asc(link_click::Column::LinkId)
            .limit(limit)
            .into_model::<LinkCountRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// 来源统计；`exclude_direct` 时去掉空来源
    pub async fn referrer_counts(
        &self,
        scope: ClickScope,
        exclude_direct: bool,
        limit: u64,
    ) -> Result<Vec<ReferrerRow>> {
        let mut query = scope.select();
        if exclude_direct {
            query = query.filter(link_click::Column::Referrer.ne(""));
        }
        let rows = query
            .select_only()
            .column(link_click::Column::Referrer)
            .column_as(link_click::Column::Id.count(), "count")
            .group_by(link_click::Column::Referrer)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(link_click::Column::Referrer)
            .limit(limit)
            .into_model::<ReferrerRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// 按设备 / 浏览器 / 系统分组计数
    pub async fn dimension_counts(
        &self,
        scope: ClickScope,
        dimension: Dimension,
        limit: Option<u64>,
    ) -> Result<Vec<LabelCountRow>> {
        let column = dimension.column();
        let rows = scope
            .select()
            .select_only()
            .column_as(column, "label")
            .column_as(link_click::Column::Id.count(), "count")
            .group_by(column)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(column)
            .limit(limit)
            .into_model::<LabelCountRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// 最早 / 最晚的一条点击
    pub async fn click_time_bounds(&self) -> Result<Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)>> {
        let first = link_click::Entity::find()
            .order_by_asc(link_click::Column::ClickedAt)
            .one(&self.db)
            .await?;
        let last = link_click::Entity::find()
            .order_by_desc(link_click::Column::ClickedAt)
            .one(&self.db)
            .await?;
        Ok(first.zip(last).map(|(f, l)| (f.clicked_at, l.clicked_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_summary_sql_contains_window() {
        let range = DateRange::custom(
            NaiveDate::from_ymd_opt(2025, 5, 27).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
        )
        .unwrap();
        let sql = SeaOrmStorage::summary_query(&ClickScope::range(range))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("COUNT(DISTINCT visitor_id)"));
        assert!(sql.contains("2025-05-27 00:00:00"));
        assert!(sql.contains("2025-06-12 00:00:00"));
    }

    #[test]
    fn test_day_expr_per_backend() {
        let render = |backend| {
            link_click::Entity::find()
                .select_only()
                .column_as(day_expr(backend), "label")
                .build(backend)
                .to_string()
        };
        assert!(render(DbBackend::Sqlite).contains("strftime"));
        assert!(render(DbBackend::MySql).contains("DATE_FORMAT"));
        assert!(render(DbBackend::Postgres).contains("TO_CHAR"));
    }
}
