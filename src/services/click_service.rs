//! 点击记录：分类 UA、写入点击、更新链接计数

use std::sync::Arc;

use tracing::debug;

use crate::analytics::ClassifierCache;
use crate::config::get_config;
use crate::errors::Result;
use crate::storage::{ClickEvent, SeaOrmStorage, TrackedLink, UtmParams};

/// 一次跳转请求中采集到的信息
#[derive(Debug, Clone, Default)]
pub struct ClickRequest {
    pub visitor_id: String,
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
    pub utm: UtmParams,
}

pub struct ClickService {
    storage: Arc<SeaOrmStorage>,
    classifier: ClassifierCache,
}

impl ClickService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            classifier: ClassifierCache::default(),
        }
    }

    /// 记录一次点击；访客第一次点击该链接时 unique_visitors 也会 +1
    ///
    /// 返回是否为新访客
    pub async fn record_click(&self, link: &TrackedLink, req: ClickRequest) -> Result<bool> {
        let new_visitor = !self
            .storage
            .visitor_has_clicked(link.id, &req.visitor_id)
            .await?;

        let event = ClickEvent {
            link_id: link.id,
            classification: self.classifier.classify(&req.user_agent),
            visitor_id: req.visitor_id,
            ip_address: req.ip_address,
            user_agent: req.user_agent,
            referrer: req.referrer,
            clicked_at: get_config().tracker.local_now(),
            utm: req.utm,
        };

        self.storage.insert_click(&event).await?;
        self.storage.bump_link_counters(link.id, new_visitor).await?;

        debug!(
            "Click on {} recorded ({} {} {}, new_visitor={})",
            link.short_code,
            event.classification.device_type,
            event.classification.browser,
            event.classification.os,
            new_visitor
        );
        Ok(new_visitor)
    }
}
