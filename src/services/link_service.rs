//! Link management service

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analytics::conversion_rate;
use crate::config::get_config;
use crate::errors::{LinkTrackerError, Result};
use crate::storage::{LinkStatus, NewLink, SeaOrmStorage, TrackedLink};
use crate::utils::url_validator::validate_destination;
use crate::utils::{generate_random_code, is_valid_short_code};

/// 生成短码时的最大尝试次数
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Request to create a new tracked link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub title: String,
    pub destination_url: String,
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkCreateResult {
    pub link_id: i64,
    pub short_code: String,
    pub short_url: String,
}

/// 列表展示用的链接
#[derive(Debug, Clone, Serialize)]
pub struct LinkOverview {
    pub id: i64,
    pub title: String,
    pub destination_url: String,
    pub short_code: String,
    pub short_url: String,
    pub campaign: Option<String>,
    pub status: LinkStatus,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub conversion_rate: String,
    pub created_at: String,
}

/// 生成完整短链接地址
pub fn short_url_for(short_code: &str) -> String {
    let config = get_config();
    config
        .tracker
        .short_url(&config.routes.link_prefix, short_code)
}

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    /// short_code -> 已发布链接，跳转热路径使用
    resolve_cache: Cache<String, TrackedLink>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            resolve_cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(60))
                .build(),
        }
    }

    fn code_length(&self) -> usize {
        get_config().tracker.short_code_length.clamp(4, 32)
    }

    /// 生成一个尚未使用的短码，最多尝试 MAX_CODE_ATTEMPTS 次
    pub async fn generate_unique_code(&self) -> Result<String> {
        let length = self.code_length();
        self.generate_unique_code_with(|| generate_random_code(length))
            .await
    }

    /// 从 `next_code` 依次取候选短码，跳过已占用的
    pub async fn generate_unique_code_with<F>(&self, mut next_code: F) -> Result<String>
    where
        F: FnMut() -> String,
    {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = next_code();
            if !self.storage.short_code_exists(&code).await? {
                return Ok(code);
            }
            debug!("Short code {} already taken (attempt {})", code, attempt);
        }
        Err(LinkTrackerError::conflict(format!(
            "Could not generate a unique short code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<LinkCreateResult> {
        let title = req.title.trim().to_string();
        if title.is_empty() || req.destination_url.trim().is_empty() {
            return Err(LinkTrackerError::validation("Missing required fields"));
        }
        let destination_url = validate_destination(&req.destination_url)
            .map_err(|e| LinkTrackerError::validation(e.to_string()))?;
        let campaign = req
            .campaign
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let now = get_config().tracker.local_now();

        for _ in 0..MAX_CODE_ATTEMPTS {
            let short_code = self.generate_unique_code().await?;
            let new_link = NewLink {
                title: title.clone(),
                destination_url: destination_url.clone(),
                short_code: short_code.clone(),
                campaign: campaign.clone(),
                status: LinkStatus::Publish,
            };

            match self.storage.insert_link(&new_link, now).await {
                Ok(link) => {
                    info!("LinkService: created link {} -> {}", link.short_code, link.destination_url);
                    return Ok(LinkCreateResult {
                        link_id: link.id,
                        short_url: short_url_for(&link.short_code),
                        short_code: link.short_code,
                    });
                }
                Err(e) => {
                    // 并发插入撞上唯一索引时换一个码重试
                    if !self.storage.short_code_exists(&short_code).await? {
                        return Err(e);
                    }
                    warn!("Short code {} taken concurrently, retrying: {}", short_code, e);
                }
            }
        }

        Err(LinkTrackerError::conflict(
            "Could not allocate a unique short code",
        ))
    }

    /// 按短码解析已发布链接；格式非法或未发布返回 None
    pub async fn resolve_code(&self, code: &str) -> Result<Option<TrackedLink>> {
        if !is_valid_short_code(code) {
            return Ok(None);
        }
        if let Some(link) = self.resolve_cache.get(code) {
            return Ok(Some(link));
        }

        let link = self
            .storage
            .find_link_by_code(code)
            .await?
            .filter(|l| l.status == LinkStatus::Publish);
        if let Some(ref link) = link {
            self.resolve_cache.insert(code.to_string(), link.clone());
        }
        Ok(link)
    }

    pub async fn get_link(&self, id: i64) -> Result<TrackedLink> {
        self.storage
            .find_link(id)
            .await?
            .ok_or_else(|| LinkTrackerError::not_found("Invalid tracked link"))
    }

    pub async fn list_links(&self) -> Result<Vec<LinkOverview>> {
        let links = self.storage.list_links(None).await?;
        Ok(links.into_iter().map(overview).collect())
    }

    /// 删除链接；该链接的点击记录保留
    pub async fn delete_link(&self, id: i64) -> Result<()> {
        let link = self.get_link(id).await?;
        if !self.storage.delete_link(id).await? {
            return Err(LinkTrackerError::not_found("Invalid tracked link"));
        }
        self.resolve_cache.invalidate(&link.short_code);
        info!("LinkService: deleted link {} ({})", id, link.short_code);
        Ok(())
    }
}

fn overview(link: TrackedLink) -> LinkOverview {
    LinkOverview {
        short_url: short_url_for(&link.short_code),
        conversion_rate: conversion_rate(link.total_clicks, link.unique_visitors),
        created_at: link.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        id: link.id,
        title: link.title,
        destination_url: link.destination_url,
        short_code: link.short_code,
        campaign: link.campaign,
        status: link.status,
        total_clicks: link.total_clicks,
        unique_visitors: link.unique_visitors,
    }
}
