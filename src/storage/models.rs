use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::analytics::Classification;

/// 链接发布状态，只有 publish 的链接可以跳转
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Publish,
    Draft,
    Trash,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedLink {
    pub id: i64,
    pub title: String,
    pub destination_url: String,
    pub short_code: String,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub campaign: Option<String>,
    pub status: LinkStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub title: String,
    pub destination_url: String,
    pub short_code: String,
    pub campaign: Option<String>,
    pub status: LinkStatus,
}

/// UTM 参数，缺省为空字符串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub term: String,
    pub content: String,
}

/// 一次点击事件（写入 link_clicks 前的形态）
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub visitor_id: String,
    pub ip_address: String,
    pub user_agent: String,
    /// 空字符串表示直接访问
    pub referrer: String,
    pub classification: Classification,
    pub clicked_at: NaiveDateTime,
    pub utm: UtmParams,
}

/// 演示数据重置结果
#[derive(Debug, Clone)]
pub struct ResetOutcome {
    pub links: Vec<TrackedLink>,
    pub total_clicks: usize,
}
