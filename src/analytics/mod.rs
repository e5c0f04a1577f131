//! 点击分析的纯逻辑部分：UA 分类与日期范围解析

pub mod classifier;
pub mod date_range;

pub use classifier::{Classification, ClassifierCache, DeviceType, classify};
pub use date_range::{DateRange, DateRangeParams, RangeMode};

/// 转化率：clicks / unique * 100，保留两位小数，去掉多余的 0
///
/// unique 为 0 时返回 "0%"
pub fn conversion_rate(clicks: i64, unique: i64) -> String {
    if unique <= 0 {
        return "0%".to_string();
    }
    let rate = (clicks as f64 / unique as f64 * 100.0 * 100.0).round() / 100.0;
    format!("{}%", rate)
}
