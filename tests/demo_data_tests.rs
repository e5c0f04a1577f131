//! 演示数据重置的集成测试

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::EntityTrait;
use tempfile::TempDir;

use linktracker::analytics::DateRange;
use linktracker::errors::LinkTrackerError;
use linktracker::services::{
    ClickRequest, ClickService, DemoDataService, DemoWindow, LinkService, MAX_CLICKS_PER_LINK,
    MIN_CLICKS_PER_LINK, StatsService,
};
use linktracker::storage::{LinkStatus, NewLink, SeaOrmStorage};
use migration::entities::LinkClickEntity;

async fn setup() -> (TempDir, Arc<SeaOrmStorage>) {
    let temp_dir = TempDir::new().expect("创建临时目录失败");
    let db_path = temp_dir.path().join("demo_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("创建存储失败");
    (temp_dir, Arc::new(storage))
}

fn window() -> DemoWindow {
    DemoWindow::new(
        NaiveDate::from_ymd_opt(2025, 5, 27).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
    )
    .unwrap()
}

fn service(storage: &Arc<SeaOrmStorage>) -> DemoDataService {
    DemoDataService::new(storage.clone(), Arc::new(LinkService::new(storage.clone())))
}

#[tokio::test]
async fn test_reset_creates_sample_link_when_empty() {
    let (_dir, storage) = setup().await;

    let summary = service(&storage).reset_with_window(window()).await.unwrap();
    assert_eq!(summary.links, 1);
    assert!((MIN_CLICKS_PER_LINK..=MAX_CLICKS_PER_LINK).contains(&summary.total_clicks));
    assert_eq!(
        summary.message,
        format!(
            "Successfully reset data. Generated {} clicks across 1 links between May 27, 2025 and June 11, 2025.",
            summary.total_clicks
        )
    );
    assert_eq!(
        summary.clicks_by_date.values().sum::<usize>(),
        summary.total_clicks
    );

    let links = storage.list_links(None).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].title, "Sample Link");
    assert_eq!(links[0].destination_url, "https://example.com");
    assert_eq!(links[0].total_clicks as usize, summary.total_clicks);
}

#[tokio::test]
async fn test_reset_replaces_all_clicks_and_recomputes_counters() {
    let (_dir, storage) = setup().await;
    let demo = service(&storage);

    let first = demo.reset_with_window(window()).await.unwrap();
    let second = demo.reset_with_window(window()).await.unwrap();

    let stored = LinkClickEntity::find()
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(stored.len(), second.total_clicks);
    assert!(first.total_clicks >= MIN_CLICKS_PER_LINK);

    // 计数与点击表一致
    let link = &storage.list_links(None).await.unwrap()[0];
    assert_eq!(link.total_clicks as usize, stored.len());
    let visitors: std::collections::HashSet<_> =
        stored.iter().map(|c| c.visitor_id.clone()).collect();
    assert_eq!(link.unique_visitors as usize, visitors.len());
}

#[tokio::test]
async fn test_reset_only_uses_published_links() {
    let (_dir, storage) = setup().await;
    let now = NaiveDate::from_ymd_opt(2025, 5, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    for (code, status) in [
        ("pub001", LinkStatus::Publish),
        ("pub002", LinkStatus::Publish),
        ("drf001", LinkStatus::Draft),
    ] {
        storage
            .insert_link(
                &NewLink {
                    title: code.to_string(),
                    destination_url: "https://example.com".to_string(),
                    short_code: code.to_string(),
                    campaign: None,
                    status,
                },
                now,
            )
            .await
            .unwrap();
    }

    let summary = service(&storage).reset_with_window(window()).await.unwrap();
    assert_eq!(summary.links, 2);
    assert!(summary.total_clicks >= 2 * MIN_CLICKS_PER_LINK);
    assert!(summary.total_clicks <= 2 * MAX_CLICKS_PER_LINK);
    // 没有新建示例链接
    assert_eq!(storage.list_links(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_reset_data_is_visible_in_window_stats() {
    let (_dir, storage) = setup().await;
    let summary = service(&storage).reset_with_window(window()).await.unwrap();

    let stats = StatsService::new(storage.clone());
    let range = DateRange::custom(window().start, window().end).unwrap();
    let dashboard = stats.dashboard_summary(&range).await;
    assert_eq!(dashboard.total_clicks as usize, summary.total_clicks);
    assert_eq!(dashboard.active_links, 1);

    let series = stats.clicks_over_time(&range).await;
    assert_eq!(series.data.iter().sum::<i64>() as usize, summary.total_clicks);
}

#[tokio::test]
async fn test_failed_reset_rolls_back() {
    let (_dir, storage) = setup().await;
    let now = NaiveDate::from_ymd_opt(2025, 5, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    // 只有草稿链接时重置会插入示例链接；让示例短码与草稿冲突，使事务中途失败
    let draft = storage
        .insert_link(
            &NewLink {
                title: "Draft".to_string(),
                destination_url: "https://example.com/draft".to_string(),
                short_code: "taken1".to_string(),
                campaign: None,
                status: LinkStatus::Draft,
            },
            now,
        )
        .await
        .unwrap();
    let clicks = ClickService::new(storage.clone());
    for visitor in ["a1", "b2"] {
        clicks
            .record_click(
                &draft,
                ClickRequest {
                    visitor_id: visitor.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let sample = NewLink {
        title: "Sample Link".to_string(),
        destination_url: "https://example.com".to_string(),
        short_code: "taken1".to_string(),
        campaign: None,
        status: LinkStatus::Publish,
    };
    let mut generated = false;
    let err = storage
        .reset_clicks_with(sample, now, |_| {
            generated = true;
            Vec::new()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LinkTrackerError::DatabaseOperation(_)));
    assert!(!generated);

    let rows = LinkClickEntity::find()
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    let links = storage.list_links(None).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].total_clicks, 2);
    assert_eq!(links[0].unique_visitors, 2);
}
