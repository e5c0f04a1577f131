//! 日期范围解析
//!
//! 两种模式：
//! - 相对模式：`date_range` 为天数（默认 30），结束日期为站点今天，开始日期为今天减 N 天
//! - 自定义模式：`date_range = "custom"` 且 from/to 都非空，闭区间 [from, to]
//!
//! 查询窗口为 `[start 00:00:00, end + 1 day 00:00:00)`，包含结束日整天。
//! 两种模式的跨度都不能超过 `MAX_RANGE_DAYS`。

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::{LinkTrackerError, Result};

pub const DEFAULT_RANGE_DAYS: i64 = 30;
/// 单次查询允许的最大天数（约十年）
pub const MAX_RANGE_DAYS: i64 = 3650;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "days")]
pub enum RangeMode {
    Relative(i64),
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub mode: RangeMode,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

/// 请求里的原始日期参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeParams {
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

impl DateRangeParams {
    pub fn custom(from: &str, to: &str) -> Self {
        Self {
            date_range: Some("custom".to_string()),
            from_date: Some(from.to_string()),
            to_date: Some(to.to_string()),
        }
    }

    pub fn days(days: i64) -> Self {
        Self {
            date_range: Some(days.to_string()),
            ..Default::default()
        }
    }

    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        DateRange::resolve(
            self.date_range.as_deref(),
            self.from_date.as_deref(),
            self.to_date.as_deref(),
            today,
        )
    }
}

/// 解析 YYYY-MM-DD，空白会被去掉
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        LinkTrackerError::validation(format!("Invalid date '{}': {}", value.trim(), e))
    })
}

/// 与 PHP intval 一致：只取开头的数字，"7days" 为 7，溢出按最大值处理
fn leading_int(value: &str) -> Option<i64> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<i64>().unwrap_or(i64::MAX))
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

impl DateRange {
    /// 按请求参数解析日期范围
    ///
    /// `mode` 为 "custom" 时使用 from/to；其他值按整数天数解析，
    /// 无法解析或 <= 0 时退回 30 天。
    pub fn resolve(
        mode: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        let mode = mode.map(str::trim).unwrap_or_default();
        let from = from.map(str::trim).filter(|s| !s.is_empty());
        let to = to.map(str::trim).filter(|s| !s.is_empty());

        if mode == "custom"
            && let (Some(from), Some(to)) = (from, to)
        {
            return Self::custom(parse_date(from)?, parse_date(to)?);
        }

        let days = leading_int(mode)
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_RANGE_DAYS);
        if days > MAX_RANGE_DAYS {
            return Err(LinkTrackerError::validation(format!(
                "Date range of {} days exceeds the maximum of {} days",
                days, MAX_RANGE_DAYS
            )));
        }
        Ok(Self::relative(days, today))
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LinkTrackerError::validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(LinkTrackerError::validation(format!(
                "Date range {}..{} spans {} days, the maximum is {}",
                start, end, days, MAX_RANGE_DAYS
            )));
        }
        Ok(Self {
            mode: RangeMode::Custom,
            start,
            end,
            days,
        })
    }

    /// 相对范围；天数非正时取默认值，超过上限时截断
    pub fn relative(days: i64, today: NaiveDate) -> Self {
        let days = (if days > 0 { days } else { DEFAULT_RANGE_DAYS }).min(MAX_RANGE_DAYS);
        Self {
            mode: RangeMode::Relative(days),
            start: days_before(today, days),
            end: today,
            days,
        }
    }

    /// 今天往前共 `days` 天（含今天），单链接趋势图使用
    pub fn trailing(days: i64, today: NaiveDate) -> Self {
        let days = days.clamp(1, MAX_RANGE_DAYS);
        Self {
            mode: RangeMode::Relative(days),
            start: days_before(today, days - 1),
            end: today,
            days,
        }
    }

    /// SQL 窗口的下界（含）
    pub fn window_start(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// SQL 窗口的上界（不含）
    pub fn window_end(&self) -> NaiveDateTime {
        self.end
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
    }

    /// 从 start 到 end 的每一天（闭区间）
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_custom_range_counts_both_ends() {
        let r = DateRange::resolve(
            Some("custom"),
            Some("2025-05-27"),
            Some("2025-06-11"),
            d("2025-07-01"),
        )
        .unwrap();
        assert_eq!(r.mode, RangeMode::Custom);
        assert_eq!(r.start, d("2025-05-27"));
        assert_eq!(r.end, d("2025-06-11"));
        assert_eq!(r.days, 16);
        assert_eq!(r.dates().count(), 16);
    }

    #[test]
    fn test_relative_range() {
        let today = d("2025-06-11");
        let r = DateRange::resolve(Some("7"), None, None, today).unwrap();
        assert_eq!(r.days, 7);
        assert_eq!(r.end, today);
        assert_eq!(r.start, d("2025-06-04"));
        // start 与 end 都包含在内
        assert_eq!(r.dates().count(), 8);
    }

    #[test]
    fn test_default_range_is_30_days() {
        let today = d("2025-06-11");
        for mode in [None, Some(""), Some("abc"), Some("0"), Some("-5")] {
            let r = DateRange::resolve(mode, None, None, today).unwrap();
            assert_eq!(r.days, 30, "mode {:?}", mode);
            assert_eq!(r.start, d("2025-05-12"));
        }
    }

    #[test]
    fn test_custom_without_dates_falls_back() {
        let today = d("2025-06-11");
        let r = DateRange::resolve(Some("custom"), Some("2025-05-01"), Some(""), today).unwrap();
        assert_eq!(r.mode, RangeMode::Relative(30));
    }

    #[test]
    fn test_custom_rejects_bad_input() {
        let today = d("2025-06-11");
        assert!(DateRange::resolve(Some("custom"), Some("27/05/2025"), Some("2025-06-11"), today).is_err());
        assert!(DateRange::resolve(Some("custom"), Some("2025-06-11"), Some("2025-05-27"), today).is_err());
    }

    #[test]
    fn test_window_includes_whole_end_day() {
        let r = DateRange::custom(d("2025-05-27"), d("2025-05-27")).unwrap();
        assert_eq!(r.days, 1);
        assert_eq!(r.window_start().to_string(), "2025-05-27 00:00:00");
        assert_eq!(r.window_end().to_string(), "2025-05-28 00:00:00");
    }

    #[test]
    fn test_params_resolve() {
        let today = d("2025-06-11");
        let r = DateRangeParams::custom("2025-05-27", "2025-06-11")
            .resolve(today)
            .unwrap();
        assert_eq!(r.days, 16);
        let r = DateRangeParams::days(7).resolve(today).unwrap();
        assert_eq!(r.start, d("2025-06-04"));
        let r = DateRangeParams::default().resolve(today).unwrap();
        assert_eq!(r.days, 30);
    }

    #[test]
    fn test_relative_days_take_leading_digits() {
        let today = d("2025-06-11");
        let r = DateRange::resolve(Some("7days"), None, None, today).unwrap();
        assert_eq!(r.days, 7);
        assert_eq!(r.start, d("2025-06-04"));
        let r = DateRange::resolve(Some(" 14 "), None, None, today).unwrap();
        assert_eq!(r.days, 14);
    }

    #[test]
    fn test_oversized_relative_range_is_rejected() {
        let today = d("2025-06-11");
        let r = DateRange::resolve(Some("3650"), None, None, today).unwrap();
        assert_eq!(r.days, MAX_RANGE_DAYS);
        for mode in ["3651", "100000000", "9223372036854775807", "99999999999999999999999"] {
            let err = DateRange::resolve(Some(mode), None, None, today).unwrap_err();
            assert!(matches!(err, LinkTrackerError::Validation(_)), "mode {}", mode);
        }
    }

    #[test]
    fn test_relative_clamps_instead_of_overflowing() {
        let today = d("2025-06-11");
        let r = DateRange::relative(i64::MAX, today);
        assert_eq!(r.days, MAX_RANGE_DAYS);
        assert_eq!(r.start, today - Duration::days(MAX_RANGE_DAYS));
        let r = DateRange::relative(10, NaiveDate::MIN);
        assert_eq!(r.start, NaiveDate::MIN);
    }

    #[test]
    fn test_oversized_custom_range_is_rejected() {
        let err = DateRange::custom(d("0001-01-01"), d("9999-12-31")).unwrap_err();
        assert!(matches!(err, LinkTrackerError::Validation(_)));
        let r = DateRange::custom(d("2015-01-01"), d("2024-12-28")).unwrap();
        assert_eq!(r.days, MAX_RANGE_DAYS);
    }

    #[test]
    fn test_trailing_series() {
        let r = DateRange::trailing(30, d("2025-06-11"));
        assert_eq!(r.start, d("2025-05-13"));
        assert_eq!(r.dates().count(), 30);
    }
}
