//! 客户端 IP 提取

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;

/// 从 X-Forwarded-For（第一个）或 X-Real-IP 取转发的 IP
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// 客户端 IP：信任代理头时优先取转发 IP，否则用对端地址
///
/// 都拿不到时返回空字符串
pub fn client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers && let Some(ip) = forwarded_ip_from_headers(req.headers()) {
        return ip;
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}
