//! 演示数据重置
//!
//! 清空全部点击记录，为每个已发布链接生成 5 到 20 条分布在演示窗口内的
//! 随机点击。破坏性操作，仅限 manage_options 权限调用。

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::{Rng, RngExt};
use serde::Serialize;
use tracing::info;

use crate::analytics::classify;
use crate::config::get_config;
use crate::errors::{LinkTrackerError, Result};
use crate::services::LinkService;
use crate::storage::{ClickEvent, LinkStatus, NewLink, SeaOrmStorage, TrackedLink, UtmParams};
use crate::utils::generate_visitor_id;

pub const MIN_CLICKS_PER_LINK: usize = 5;
pub const MAX_CLICKS_PER_LINK: usize = 20;

pub const SAMPLE_USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 11; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.120 Mobile Safari/537.36",
];

/// 两个空串让直接访问占更大比例
pub const SAMPLE_REFERRERS: [&str; 7] = [
    "https://www.google.com/",
    "https://www.facebook.com/",
    "https://www.twitter.com/",
    "https://www.instagram.com/",
    "https://www.linkedin.com/",
    "",
    "",
];

#[derive(Debug, Clone, Serialize)]
pub struct ResetSummary {
    pub message: String,
    pub total_clicks: usize,
    pub links: usize,
    pub start_date: String,
    pub end_date: String,
    /// YYYY-MM-DD -> 点击数
    pub clicks_by_date: BTreeMap<String, usize>,
}

/// 演示窗口：闭区间 [start, end]
#[derive(Debug, Clone, Copy)]
pub struct DemoWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DemoWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LinkTrackerError::validation(format!(
                "Demo window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    fn random_timestamp<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDateTime {
        let day = self.start + Duration::days(rng.random_range(0..self.days()));
        let time = NaiveTime::from_hms_opt(
            rng.random_range(0..=23),
            rng.random_range(0..=59),
            rng.random_range(0..=59),
        )
        .unwrap_or(NaiveTime::MIN);
        day.and_time(time)
    }
}

fn random_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.random_range(1..=255u8),
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8)
    )
}

/// 为给定链接生成随机点击
pub fn generate_clicks<R: Rng + ?Sized>(
    rng: &mut R,
    links: &[TrackedLink],
    window: DemoWindow,
) -> Vec<ClickEvent> {
    let mut clicks = Vec::new();
    for link in links {
        let count = rng.random_range(MIN_CLICKS_PER_LINK..=MAX_CLICKS_PER_LINK);
        for _ in 0..count {
            let user_agent = SAMPLE_USER_AGENTS[rng.random_range(0..SAMPLE_USER_AGENTS.len())];
            let referrer = SAMPLE_REFERRERS[rng.random_range(0..SAMPLE_REFERRERS.len())];
            clicks.push(ClickEvent {
                link_id: link.id,
                visitor_id: generate_visitor_id(),
                ip_address: random_ip(rng),
                user_agent: user_agent.to_string(),
                referrer: referrer.to_string(),
                classification: classify(user_agent),
                clicked_at: window.random_timestamp(rng),
                utm: UtmParams::default(),
            });
        }
    }
    clicks
}

pub fn clicks_by_date(clicks: &[ClickEvent]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for click in clicks {
        *counts
            .entry(click.clicked_at.date().format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
    }
    counts
}

pub struct DemoDataService {
    storage: Arc<SeaOrmStorage>,
    links: Arc<LinkService>,
}

impl DemoDataService {
    pub fn new(storage: Arc<SeaOrmStorage>, links: Arc<LinkService>) -> Self {
        Self { storage, links }
    }

    /// 用配置中的演示窗口重置
    pub async fn reset(&self) -> Result<ResetSummary> {
        let demo = get_config().demo.clone();
        self.reset_with_window(DemoWindow::new(demo.window_start, demo.window_end)?)
            .await
    }

    pub async fn reset_with_window(&self, window: DemoWindow) -> Result<ResetSummary> {
        info!(
            "DemoData: resetting click data for window {} .. {}",
            window.start, window.end
        );

        let sample = NewLink {
            title: "Sample Link".to_string(),
            destination_url: "https://example.com".to_string(),
            short_code: self.links.generate_unique_code().await?,
            campaign: None,
            status: LinkStatus::Publish,
        };
        let now = get_config().tracker.local_now();

        let mut by_date = BTreeMap::new();
        let outcome = self
            .storage
            .reset_clicks_with(sample, now, |links| {
                let clicks = generate_clicks(&mut rand::rng(), links, window);
                by_date = clicks_by_date(&clicks);
                clicks
            })
            .await?;

        let start_date = window.start.format("%B %-d, %Y").to_string();
        let end_date = window.end.format("%B %-d, %Y").to_string();
        Ok(ResetSummary {
            message: format!(
                "Successfully reset data. Generated {} clicks across {} links between {} and {}.",
                outcome.total_clicks,
                outcome.links.len(),
                start_date,
                end_date
            ),
            total_clicks: outcome.total_clicks,
            links: outcome.links.len(),
            start_date,
            end_date,
            clicks_by_date: by_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::DeviceType;

    fn window() -> DemoWindow {
        DemoWindow::new(
            NaiveDate::from_ymd_opt(2025, 5, 27).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
        )
        .unwrap()
    }

    fn link(id: i64) -> TrackedLink {
        let ts = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        TrackedLink {
            id,
            title: format!("Link {}", id),
            destination_url: "https://example.com".to_string(),
            short_code: format!("code{}", id),
            total_clicks: 0,
            unique_visitors: 0,
            campaign: None,
            status: LinkStatus::Publish,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_window_days() {
        assert_eq!(window().days(), 16);
        assert!(
            DemoWindow::new(
                NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 27).unwrap()
            )
            .is_err()
        );
    }

    #[test]
    fn test_generated_clicks_stay_in_bounds() {
        let links = vec![link(1), link(2), link(3)];
        let w = window();
        let clicks = generate_clicks(&mut rand::rng(), &links, w);

        for l in &links {
            let n = clicks.iter().filter(|c| c.link_id == l.id).count();
            assert!((MIN_CLICKS_PER_LINK..=MAX_CLICKS_PER_LINK).contains(&n));
        }
        for c in &clicks {
            let day = c.clicked_at.date();
            assert!(day >= w.start && day <= w.end);
            assert_eq!(c.visitor_id.len(), 32);
            assert!(SAMPLE_USER_AGENTS.contains(&c.user_agent.as_str()));
            assert!(SAMPLE_REFERRERS.contains(&c.referrer.as_str()));
            assert_eq!(c.classification, classify(&c.user_agent));
            let first_octet: u16 = c.ip_address.split('.').next().unwrap().parse().unwrap();
            assert!(first_octet >= 1);
        }
        assert_eq!(clicks_by_date(&clicks).values().sum::<usize>(), clicks.len());
    }

    #[test]
    fn test_sample_agents_classification() {
        let devices: Vec<DeviceType> = SAMPLE_USER_AGENTS
            .iter()
            .map(|ua| classify(ua).device_type)
            .collect();
        assert_eq!(
            devices,
            vec![
                DeviceType::Desktop,
                DeviceType::Desktop,
                DeviceType::Desktop,
                DeviceType::Mobile,
                DeviceType::Tablet,
                DeviceType::Mobile,
            ]
        );
    }
}
