use std::borrow::Cow;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use tracing::{debug, error, trace, warn};

use crate::api::AppState;
use crate::config::get_config;
use crate::services::ClickRequest;
use crate::storage::{TrackedLink, UtmParams};
use crate::utils::ip::client_ip;
use crate::utils::{generate_visitor_id, is_valid_short_code, is_valid_visitor_id};

/// link_clicks 中 utm_* 列的长度上限（字符数）
pub const MAX_UTM_LENGTH: usize = 255;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        state: web::Data<AppState>,
    ) -> HttpResponse {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            trace!("Invalid short code rejected: {}", &code);
            return Self::not_found_response();
        }

        match state.links.resolve_code(&code).await {
            Ok(Some(link)) => {
                let (visitor_id, fresh_visitor) = Self::visitor_id(&req);
                Self::record_click(&state, &req, &link, visitor_id.clone()).await;
                Self::finish_redirect(&link, fresh_visitor.then_some(visitor_id))
            }
            Ok(None) => {
                debug!("Redirect link not found: {}", &code);
                Self::not_found_response()
            }
            Err(e) => {
                error!("Database error during redirect lookup: {}", e);
                Self::error_response()
            }
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }

    /// 读取访客 cookie，没有或格式不对时生成新的
    ///
    /// 第二个返回值表示是否需要下发 cookie
    fn visitor_id(req: &HttpRequest) -> (String, bool) {
        let name = &get_config().tracker.visitor_cookie;
        match req.cookie(name) {
            Some(c) if is_valid_visitor_id(c.value()) => (c.value().to_string(), false),
            _ => (generate_visitor_id(), true),
        }
    }

    fn visitor_cookie(value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(get_config().tracker.visitor_cookie.clone(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(CookieDuration::days(365));
        cookie
    }

    /// 从 query string 提取指定参数值
    #[inline]
    fn extract_query_param<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
        for part in query.split('&') {
            if let Some(value) = part.strip_prefix(key).and_then(|s| s.strip_prefix('=')) {
                // 表单编码里 + 表示空格
                let value = value.replace('+', " ");
                return urlencoding::decode(&value)
                    .ok()
                    .map(|v| Cow::Owned(v.into_owned()));
            }
        }
        None
    }

    fn utm_params(req: &HttpRequest) -> UtmParams {
        let Some(query) = req.uri().query() else {
            return UtmParams::default();
        };
        let get = |key: &str| {
            Self::extract_query_param(query, key)
                .map(|v| v.chars().take(MAX_UTM_LENGTH).collect::<String>())
                .unwrap_or_default()
        };
        UtmParams {
            source: get("utm_source"),
            medium: get("utm_medium"),
            campaign: get("utm_campaign"),
            term: get("utm_term"),
            content: get("utm_content"),
        }
    }

    fn header(req: &HttpRequest, name: &str) -> String {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    /// 记录点击；失败只记日志，不影响跳转
    async fn record_click(
        state: &AppState,
        req: &HttpRequest,
        link: &TrackedLink,
        visitor_id: String,
    ) {
        let click = ClickRequest {
            visitor_id,
            ip_address: client_ip(req, get_config().tracker.trust_proxy_headers),
            user_agent: Self::header(req, "user-agent"),
            referrer: Self::header(req, "referer"),
            utm: Self::utm_params(req),
        };
        if let Err(e) = state.clicks.record_click(link, click).await {
            warn!("Failed to record click for {}: {}", link.short_code, e);
        }
    }

    fn redirect_status() -> StatusCode {
        match get_config().tracker.redirect_status {
            301 => StatusCode::MOVED_PERMANENTLY,
            307 => StatusCode::TEMPORARY_REDIRECT,
            308 => StatusCode::PERMANENT_REDIRECT,
            _ => StatusCode::FOUND,
        }
    }

    fn finish_redirect(link: &TrackedLink, new_cookie: Option<String>) -> HttpResponse {
        let mut builder = HttpResponse::build(Self::redirect_status());
        builder
            .insert_header(("Location", link.destination_url.as_str()))
            .insert_header(("Cache-Control", "no-store"));
        if let Some(value) = new_cookie {
            builder.cookie(Self::visitor_cookie(value));
        }
        builder.finish()
    }
}

/// Redirect 路由配置，挂载在 `/<link_prefix>` 下
pub fn redirect_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_query_param_decodes() {
        let q = "utm_source=news%20letter&utm_medium=email+blast";
        assert_eq!(
            RedirectService::extract_query_param(q, "utm_source").as_deref(),
            Some("news letter")
        );
        assert_eq!(
            RedirectService::extract_query_param(q, "utm_medium").as_deref(),
            Some("email blast")
        );
        assert!(RedirectService::extract_query_param(q, "utm_term").is_none());
    }

    #[test]
    fn test_utm_params_from_request() {
        let req = TestRequest::get()
            .uri("/go/abc123?utm_source=google&utm_campaign=spring")
            .to_http_request();
        let utm = RedirectService::utm_params(&req);
        assert_eq!(utm.source, "google");
        assert_eq!(utm.campaign, "spring");
        assert_eq!(utm.medium, "");
    }

    #[test]
    fn test_long_utm_values_are_truncated() {
        let long = "ü".repeat(300);
        let req = TestRequest::get()
            .uri(&format!(
                "/go/abc123?utm_source={}&utm_term=x",
                urlencoding::encode(&long)
            ))
            .to_http_request();
        let utm = RedirectService::utm_params(&req);
        assert_eq!(utm.source.chars().count(), MAX_UTM_LENGTH);
        assert_eq!(utm.term, "x");
    }

    #[test]
    fn test_existing_visitor_cookie_is_reused() {
        let id = "0123456789abcdef0123456789abcdef";
        let req = TestRequest::get()
            .cookie(Cookie::new("lt_visitor", id))
            .to_http_request();
        assert_eq!(RedirectService::visitor_id(&req), (id.to_string(), false));

        let req = TestRequest::get()
            .cookie(Cookie::new("lt_visitor", "not-a-visitor"))
            .to_http_request();
        let (fresh, set_cookie) = RedirectService::visitor_id(&req);
        assert!(set_cookie);
        assert!(is_valid_visitor_id(&fresh));
    }
}
