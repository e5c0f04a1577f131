//! 跳转与点击记录的集成测试

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, cookie::Cookie, web};
use chrono::NaiveDate;
use sea_orm::EntityTrait;
use tempfile::TempDir;

use linktracker::api::AppState;
use linktracker::api::services::redirect_routes;
use linktracker::services::CreateLinkRequest;
use linktracker::storage::{LinkStatus, NewLink, SeaOrmStorage};
use migration::entities::LinkClickEntity;

const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

async fn setup() -> (TempDir, AppState) {
    let temp_dir = TempDir::new().expect("创建临时目录失败");
    let db_path = temp_dir.path().join("redirect_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("创建存储失败");
    (temp_dir, AppState::new(Arc::new(storage), Duration::from_secs(60)))
}

async fn create(state: &AppState, url: &str) -> (i64, String) {
    let created = state
        .links
        .create_link(CreateLinkRequest {
            title: "Landing".to_string(),
            destination_url: url.to_string(),
            campaign: None,
        })
        .await
        .expect("创建链接失败");
    (created.link_id, created.short_code)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .service(web::scope("/go").configure(redirect_routes)),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_redirect_records_click_and_sets_cookie() {
    let (_dir, state) = setup().await;
    let (link_id, code) = create(&state, "https://example.com/landing").await;
    let app = app!(state);

    let req = TestRequest::get()
        .uri(&format!("/go/{}?utm_source=newsletter&utm_medium=email", code))
        .insert_header(("User-Agent", IPAD_UA))
        .insert_header(("Referer", "https://news.example.org/post/1"))
        .peer_addr("192.0.2.10:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/landing"
    );
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "lt_visitor")
        .expect("visitor cookie");
    assert_eq!(cookie.value().len(), 32);

    let link = state.links.get_link(link_id).await.unwrap();
    assert_eq!(link.total_clicks, 1);
    assert_eq!(link.unique_visitors, 1);

    let clicks = LinkClickEntity::find()
        .all(state.storage.get_db())
        .await
        .unwrap();
    assert_eq!(clicks.len(), 1);
    let click = &clicks[0];
    assert_eq!(click.visitor_id, cookie.value());
    assert_eq!(click.ip_address, "192.0.2.10");
    assert_eq!(click.referrer, "https://news.example.org/post/1");
    assert_eq!(click.device_type, "Tablet");
    assert_eq!(click.browser, "Safari");
    assert_eq!(click.utm_source, "newsletter");
    assert_eq!(click.utm_medium, "email");
    assert_eq!(click.utm_campaign, "");
}

#[actix_rt::test]
async fn test_returning_visitor_counts_once() {
    let (_dir, state) = setup().await;
    let (link_id, code) = create(&state, "https://example.com").await;
    let app = app!(state);
    let visitor = "0123456789abcdef0123456789abcdef";

    for _ in 0..3 {
        let req = TestRequest::get()
            .uri(&format!("/go/{}", code))
            .cookie(Cookie::new("lt_visitor", visitor))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        // 已有合法 cookie 时不重新下发
        assert!(resp.response().cookies().next().is_none());
    }

    let link = state.links.get_link(link_id).await.unwrap();
    assert_eq!(link.total_clicks, 3);
    assert_eq!(link.unique_visitors, 1);
}

#[actix_rt::test]
async fn test_head_request_redirects() {
    let (_dir, state) = setup().await;
    let (_, code) = create(&state, "https://example.com/head").await;
    let app = app!(state);

    let req = TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri(&format!("/go/{}", code))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_rt::test]
async fn test_unknown_and_invalid_codes_are_not_found() {
    let (_dir, state) = setup().await;
    let app = app!(state);

    for uri in ["/go/zzzzzz", "/go/bad-code!", "/go/%2e%2e"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }

    let clicks = LinkClickEntity::find()
        .all(state.storage.get_db())
        .await
        .unwrap();
    assert!(clicks.is_empty());
}

#[actix_rt::test]
async fn test_unpublished_link_is_not_found() {
    let (_dir, state) = setup().await;
    let now = NaiveDate::from_ymd_opt(2025, 5, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    state
        .storage
        .insert_link(
            &NewLink {
                title: "Draft".to_string(),
                destination_url: "https://example.com".to_string(),
                short_code: "draft1".to_string(),
                campaign: None,
                status: LinkStatus::Draft,
            },
            now,
        )
        .await
        .unwrap();
    let app = app!(state);

    let req = TestRequest::get().uri("/go/draft1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_non_ascii_destination_redirects() {
    let (_dir, state) = setup().await;
    let (link_id, code) = create(&state, "https://example.com/über?q=straße").await;
    let app = app!(state);

    let req = TestRequest::get().uri(&format!("/go/{}", code)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/%C3%BCber?q=stra%C3%9Fe"
    );
    let link = state.links.get_link(link_id).await.unwrap();
    assert_eq!(link.total_clicks, 1);
}
