//! Admin API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::errors::LinkTrackerError;

use super::error_code::{ErrorCode, http_status};
use super::types::ApiEnvelope;

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok()
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiEnvelope::ok(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiEnvelope::<()>::failure(message, code))
}

/// 从 LinkTrackerError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_tracker(err: &LinkTrackerError) -> HttpResponse {
    let status = http_status(err);
    if status.is_server_error() {
        warn!("Admin action failed: {}", err);
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_tracker(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("success_data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_from_tracker_maps_status() {
        let response = error_from_tracker(&LinkTrackerError::invalid_nonce("Invalid nonce"));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = error_from_tracker(&LinkTrackerError::not_found("Invalid tracked link"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
