//! Stats/reporting service
//!
//! 所有仪表盘查询都直接聚合 link_clicks。数据缺失（表不存在、查询失败、
//! 范围内无点击）时返回零值或默认标签，不向调用方报错；只有单链接统计
//! 在链接不存在时返回 NotFound。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analytics::{DateRange, DateRangeParams, conversion_rate};
use crate::config::get_config;
use crate::errors::{LinkTrackerError, Result};
use crate::services::short_url_for;
use crate::storage::backend::{DateCountRow, LabelCountRow, ReferrerRow, SummaryRow};
use crate::storage::{ClickScope, Dimension, SeaOrmStorage, TrackedLink};
use crate::utils::url_validator::referrer_display;

pub const TOP_LINKS_LIMIT: u64 = 10;
pub const TOP_REFERRERS_LIMIT: u64 = 10;
pub const BREAKDOWN_LIMIT: u64 = 5;
pub const LINK_SERIES_DAYS: i64 = 30;
const DATA_COUNT_LINKS_LIMIT: u64 = 20;

const DEFAULT_DEVICE_LABELS: [&str; 3] = ["Desktop", "Mobile", "Tablet"];
const DEFAULT_BROWSER_LABELS: [&str; 5] = ["Chrome", "Firefox", "Safari", "Edge", "Other"];
const DEFAULT_OS_LABELS: [&str; 5] = ["Windows", "macOS", "iOS", "Android", "Linux"];

// ============ 返回类型 ============

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub active_links: i64,
    pub conversion_rate: String,
}

impl Default for DashboardSummary {
    fn default() -> Self {
        Self::from(SummaryRow::default())
    }
}

impl From<SummaryRow> for DashboardSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            conversion_rate: conversion_rate(row.total_clicks, row.unique_visitors),
            total_clicks: row.total_clicks,
            unique_visitors: row.unique_visitors,
            active_links: row.active_links,
        }
    }
}

/// 按天的时间序列，dates 为 YYYY-MM-DD，labels 形如 "May 27"
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ClicksOverTime {
    pub dates: Vec<String>,
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopLinkEntry {
    pub id: i64,
    pub title: String,
    pub short_code: String,
    pub short_url: String,
    pub clicks: i64,
    pub unique_visitors: i64,
    pub conversion_rate: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReferrerEntry {
    /// 原始来源，空来源为 "Direct"
    pub referrer: String,
    /// 展示用：URL 只保留 host
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DeviceBreakdown {
    pub device_types: ChartSeries,
    pub browsers: ChartSeries,
    pub operating_systems: ChartSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkStats {
    pub link: TrackedLink,
    pub short_url: String,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub conversion_rate: String,
    pub clicks: ClicksOverTime,
    pub referrers: Vec<ReferrerEntry>,
    pub devices: DeviceBreakdown,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRangeDebug {
    pub date_range: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub calculated_start: String,
    pub calculated_end: String,
    pub days: i64,
    pub query: String,
    pub total_clicks: i64,
    pub clicks_by_date: Vec<DateCount>,
    pub all_clicks_by_date: Vec<DateCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkClickCount {
    pub link_id: i64,
    pub title: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DataCount {
    pub table_exists: bool,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub links_with_clicks: i64,
    pub earliest_click: Option<String>,
    pub latest_click: Option<String>,
    pub clicks_by_date: Vec<DateCount>,
    pub clicks_by_link: Vec<LinkClickCount>,
}

// ============ 组装函数 ============

/// 查询失败时记 warn 并退回默认值
fn or_default<T: Default>(what: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!("Stats: {} failed, returning empty result: {}", what, e);
        T::default()
    })
}

/// 按天补零：range 内每天一个点，覆盖查询结果中的计数
pub fn fill_daily_series(range: &DateRange, rows: &[DateCountRow]) -> ClicksOverTime {
    let counts: HashMap<&str, i64> = rows.iter().map(|r| (r.label.as_str(), r.count)).collect();
    let mut series = ClicksOverTime::default();
    for day in range.dates() {
        let key = day.format("%Y-%m-%d").to_string();
        series.data.push(counts.get(key.as_str()).copied().unwrap_or(0));
        series.labels.push(day.format("%b %-d").to_string());
        series.dates.push(key);
    }
    series
}

/// 维度统计转图表数据；空值显示为 Unknown，无数据时使用 defaults（若有）
fn to_chart_series(rows: Vec<LabelCountRow>, defaults: Option<&[&str]>) -> ChartSeries {
    if rows.is_empty()
        && let Some(defaults) = defaults
    {
        return ChartSeries {
            labels: defaults.iter().map(|l| l.to_string()).collect(),
            data: vec![0; defaults.len()],
        };
    }

    let mut series = ChartSeries::default();
    for row in rows {
        series.labels.push(if row.label.is_empty() {
            "Unknown".to_string()
        } else {
            row.label
        });
        series.data.push(row.count);
    }
    series
}

fn to_referrer_entries(rows: Vec<ReferrerRow>) -> Vec<ReferrerEntry> {
    rows.into_iter()
        .map(|row| ReferrerEntry {
            source: referrer_display(&row.referrer),
            referrer: if row.referrer.is_empty() {
                "Direct".to_string()
            } else {
                row.referrer
            },
            count: row.count,
        })
        .collect()
}

fn to_date_counts(rows: Vec<DateCountRow>) -> Vec<DateCount> {
    rows.into_iter()
        .map(|r| DateCount {
            date: r.label,
            count: r.count,
        })
        .collect()
}

// ============ StatsService ============

pub struct StatsService {
    storage: Arc<SeaOrmStorage>,
}

impl StatsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn today(&self) -> NaiveDate {
        get_config().tracker.today()
    }

    /// 按请求参数和站点今天解析日期范围
    pub fn resolve_range(&self, params: &DateRangeParams) -> Result<DateRange> {
        params.resolve(self.today())
    }

    pub async fn dashboard_summary(&self, range: &DateRange) -> DashboardSummary {
        info!(
            "Stats: dashboard_summary from {} to {}",
            range.start, range.end
        );

        if !self.storage.click_table_exists().await {
            warn!("Stats: link_clicks table missing, returning zero summary");
            return DashboardSummary::default();
        }

        let row = or_default(
            "dashboard_summary",
            self.storage.click_summary(ClickScope::range(*range)).await,
        );
        DashboardSummary::from(row)
    }

    pub async fn clicks_over_time(&self, range: &DateRange) -> ClicksOverTime {
        info!(
            "Stats: clicks_over_time from {} to {}",
            range.start, range.end
        );

        let rows = or_default(
            "clicks_over_time",
            self.storage.clicks_by_day(ClickScope::range(*range)).await,
        );
        let series = fill_daily_series(range, &rows);
        debug!(
            "Stats: clicks_over_time returned {} days ({} with clicks)",
            series.dates.len(),
            rows.len()
        );
        series
    }

    pub async fn top_links(&self, range: &DateRange) -> Vec<TopLinkEntry> {
        info!("Stats: top_links from {} to {}", range.start, range.end);

        let rows = or_default(
            "top_links",
            self.storage
                .link_click_counts(ClickScope::range(*range), true, TOP_LINKS_LIMIT)
                .await,
        );

        if rows.is_empty() {
            // 范围内没有点击时，列出已发布链接（计数为 0）
            let links = or_default(
                "top_links fallback",
                self.storage.published_links(Some(TOP_LINKS_LIMIT)).await,
            );
            return links
                .into_iter()
                .map(|link| TopLinkEntry {
                    short_url: short_url_for(&link.short_code),
                    id: link.id,
                    title: link.title,
                    short_code: link.short_code,
                    clicks: 0,
                    unique_visitors: 0,
                    conversion_rate: conversion_rate(0, 0),
                })
                .collect();
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.link_id).collect();
        let links: HashMap<i64, TrackedLink> = or_default(
            "top_links titles",
            self.storage.find_links_by_ids(&ids).await,
        )
        .into_iter()
        .map(|l| (l.id, l))
        .collect();

        let entries: Vec<TopLinkEntry> = rows
            .into_iter()
            .filter_map(|row| {
                let link = links.get(&row.link_id)?;
                Some(TopLinkEntry {
                    id: link.id,
                    title: link.title.clone(),
                    short_code: link.short_code.clone(),
                    short_url: short_url_for(&link.short_code),
                    clicks: row.clicks,
                    unique_visitors: row.unique_visitors,
                    conversion_rate: conversion_rate(row.clicks, row.unique_visitors),
                })
            })
            .collect();
        debug!("Stats: top_links returned {} links", entries.len());
        entries
    }

    pub async fn top_referrers(&self, range: &DateRange) -> Vec<ReferrerEntry> {
        info!(
            "Stats: top_referrers from {} to {}",
            range.start, range.end
        );

        let rows = or_default(
            "top_referrers",
            self.storage
                .referrer_counts(ClickScope::range(*range), false, TOP_REFERRERS_LIMIT)
                .await,
        );
        to_referrer_entries(rows)
    }

    /// 设备 / 浏览器 / 系统分布；某一维度没有数据时给出默认标签
    pub async fn device_breakdown(&self, range: &DateRange) -> DeviceBreakdown {
        info!(
            "Stats: device_breakdown from {} to {}",
            range.start, range.end
        );

        let scope = ClickScope::range(*range);
        let (devices, browsers, os) = tokio::join!(
            self.storage.dimension_counts(scope, Dimension::DeviceType, None),
            self.storage
                .dimension_counts(scope, Dimension::Browser, Some(BREAKDOWN_LIMIT)),
            self.storage
                .dimension_counts(scope, Dimension::Os, Some(BREAKDOWN_LIMIT)),
        );

        DeviceBreakdown {
            device_types: to_chart_series(
                or_default("device_types", devices),
                Some(&DEFAULT_DEVICE_LABELS),
            ),
            browsers: to_chart_series(
                or_default("browsers", browsers),
                Some(&DEFAULT_BROWSER_LABELS),
            ),
            operating_systems: to_chart_series(
                or_default("operating_systems", os),
                Some(&DEFAULT_OS_LABELS),
            ),
        }
    }

    /// 单链接统计：累计数据 + 最近 30 天趋势 + 来源 + 设备分布
    pub async fn link_stats(&self, link_id: i64) -> Result<LinkStats> {
        info!("Stats: link_stats for link {}", link_id);

        let link = self
            .storage
            .find_link(link_id)
            .await?
            .ok_or_else(|| LinkTrackerError::not_found("Invalid tracked link"))?;

        let series_range = DateRange::trailing(LINK_SERIES_DAYS, self.today());
        let scope = ClickScope::link(link_id);

        let (summary, by_day, referrers, devices, browsers, os) = tokio::join!(
            self.storage.click_summary(scope),
            self.storage.clicks_by_day(scope.with_range(series_range)),
            self.storage
                .referrer_counts(scope, true, TOP_REFERRERS_LIMIT),
            self.storage.dimension_counts(scope, Dimension::DeviceType, None),
            self.storage
                .dimension_counts(scope, Dimension::Browser, Some(BREAKDOWN_LIMIT)),
            self.storage
                .dimension_counts(scope, Dimension::Os, Some(BREAKDOWN_LIMIT)),
        );

        let summary = or_default("link summary", summary);
        let by_day = or_default("link clicks_by_day", by_day);

        Ok(LinkStats {
            short_url: short_url_for(&link.short_code),
            total_clicks: summary.total_clicks,
            unique_visitors: summary.unique_visitors,
            conversion_rate: conversion_rate(summary.total_clicks, summary.unique_visitors),
            clicks: fill_daily_series(&series_range, &by_day),
            referrers: to_referrer_entries(or_default("link referrers", referrers)),
            devices: DeviceBreakdown {
                device_types: to_chart_series(or_default("link devices", devices), None),
                browsers: to_chart_series(or_default("link browsers", browsers), None),
                operating_systems: to_chart_series(or_default("link os", os), None),
            },
            link,
        })
    }

    /// 日期范围诊断：回显参数、计算结果、SQL 与按天计数
    pub async fn debug_date_range(&self, params: &DateRangeParams) -> Result<DateRangeDebug> {
        let range = self.resolve_range(params)?;
        info!(
            "Stats: debug_date_range {:?} -> {} .. {}",
            params, range.start, range.end
        );

        let scope = ClickScope::range(range);
        let (summary, in_range, all_time) = tokio::join!(
            self.storage.click_summary(scope),
            self.storage.clicks_by_day(scope),
            self.storage.clicks_by_day(ClickScope::all()),
        );

        Ok(DateRangeDebug {
            date_range: params.date_range.clone(),
            from_date: params.from_date.clone(),
            to_date: params.to_date.clone(),
            calculated_start: range.start.format("%Y-%m-%d").to_string(),
            calculated_end: range.end.format("%Y-%m-%d").to_string(),
            days: range.days,
            query: self.storage.click_summary_sql(scope),
            total_clicks: or_default("debug summary", summary).total_clicks,
            clicks_by_date: to_date_counts(or_default("debug clicks_by_date", in_range)),
            all_clicks_by_date: to_date_counts(or_default("debug all_clicks_by_date", all_time)),
        })
    }

    /// 点击表的整体概况
    pub async fn data_count(&self) -> DataCount {
        info!("Stats: data_count");

        if !self.storage.click_table_exists().await {
            warn!("Stats: link_clicks table missing");
            return DataCount::default();
        }

        let scope = ClickScope::all();
        let (summary, bounds, by_day, by_link) = tokio::join!(
            self.storage.click_summary(scope),
            self.storage.click_time_bounds(),
            self.storage.clicks_by_day(scope),
            self.storage
                .link_click_counts(scope, false, DATA_COUNT_LINKS_LIMIT),
        );

        let summary = or_default("data_count summary", summary);
        let bounds = or_default("data_count bounds", bounds);
        let by_link = or_default("data_count by_link", by_link);

        let ids: Vec<i64> = by_link.iter().map(|r| r.link_id).collect();
        let titles: HashMap<i64, String> = or_default(
            "data_count titles",
            self.storage.find_links_by_ids(&ids).await,
        )
        .into_iter()
        .map(|l| (l.id, l.title))
        .collect();

        DataCount {
            table_exists: true,
            total_clicks: summary.total_clicks,
            unique_visitors: summary.unique_visitors,
            links_with_clicks: summary.active_links,
            earliest_click: bounds.map(|(first, _)| first.format("%Y-%m-%d %H:%M:%S").to_string()),
            latest_click: bounds.map(|(_, last)| last.format("%Y-%m-%d %H:%M:%S").to_string()),
            clicks_by_date: to_date_counts(or_default("data_count clicks_by_date", by_day)),
            clicks_by_link: by_link
                .into_iter()
                .map(|row| LinkClickCount {
                    title: titles
                        .get(&row.link_id)
                        .cloned()
                        .unwrap_or_else(|| format!("(deleted link #{})", row.link_id)),
                    link_id: row.link_id,
                    clicks: row.clicks,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_fill_daily_series_gap_fills() {
        let range = DateRange::custom(d("2025-05-30"), d("2025-06-02")).unwrap();
        let rows = vec![
            DateCountRow {
                label: "2025-05-31".to_string(),
                count: 4,
            },
            DateCountRow {
                label: "2025-06-02".to_string(),
                count: 1,
            },
        ];
        let series = fill_daily_series(&range, &rows);
        assert_eq!(
            series.dates,
            vec!["2025-05-30", "2025-05-31", "2025-06-01", "2025-06-02"]
        );
        assert_eq!(series.labels, vec!["May 30", "May 31", "Jun 1", "Jun 2"]);
        assert_eq!(series.data, vec![0, 4, 0, 1]);
    }

    #[test]
    fn test_chart_series_defaults_and_unknown() {
        let empty = to_chart_series(Vec::new(), Some(&DEFAULT_OS_LABELS));
        assert_eq!(empty.labels, DEFAULT_OS_LABELS.to_vec());
        assert_eq!(empty.data, vec![0; 5]);

        let no_defaults = to_chart_series(Vec::new(), None);
        assert!(no_defaults.labels.is_empty());

        let rows = vec![
            LabelCountRow {
                label: "Chrome".to_string(),
                count: 3,
            },
            LabelCountRow {
                label: String::new(),
                count: 1,
            },
        ];
        let series = to_chart_series(rows, Some(&DEFAULT_BROWSER_LABELS));
        assert_eq!(series.labels, vec!["Chrome", "Unknown"]);
        assert_eq!(series.data, vec![3, 1]);
    }

    #[test]
    fn test_referrer_entries() {
        let rows = vec![
            ReferrerRow {
                referrer: String::new(),
                count: 5,
            },
            ReferrerRow {
                referrer: "https://www.google.com/".to_string(),
                count: 2,
            },
        ];
        let entries = to_referrer_entries(rows);
        assert_eq!(entries[0].referrer, "Direct");
        assert_eq!(entries[0].source, "Direct");
        assert_eq!(entries[1].referrer, "https://www.google.com/");
        assert_eq!(entries[1].source, "www.google.com");
    }

    #[test]
    fn test_default_summary() {
        let summary = DashboardSummary::default();
        assert_eq!(summary.total_clicks, 0);
        assert_eq!(summary.conversion_rate, "0%");
    }
}
