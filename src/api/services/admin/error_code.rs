//! 统一 API 错误码定义

use actix_web::http::StatusCode;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LinkTrackerError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 链接错误
/// - 6000-6099: 统计错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    UnknownAction = 1013,

    NonceInvalid = 2002,
    PermissionDenied = 2005,

    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkDatabaseError = 3005,

    AnalyticsQueryFailed = 6000,
}

impl From<&LinkTrackerError> for ErrorCode {
    fn from(err: &LinkTrackerError) -> Self {
        match err {
            LinkTrackerError::Validation(_) => ErrorCode::BadRequest,
            LinkTrackerError::DateParse(_) => ErrorCode::InvalidDateFormat,
            LinkTrackerError::NotFound(_) => ErrorCode::LinkNotFound,
            LinkTrackerError::Conflict(_) => ErrorCode::LinkAlreadyExists,
            LinkTrackerError::InvalidNonce(_) => ErrorCode::NonceInvalid,
            LinkTrackerError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            LinkTrackerError::DatabaseOperation(_) => ErrorCode::LinkDatabaseError,
            LinkTrackerError::DatabaseConfig(_)
            | LinkTrackerError::DatabaseConnection(_)
            | LinkTrackerError::FileOperation(_)
            | LinkTrackerError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}

/// 错误对应的 HTTP 状态码
pub fn http_status(err: &LinkTrackerError) -> StatusCode {
    match err {
        LinkTrackerError::Validation(_) | LinkTrackerError::DateParse(_) => {
            StatusCode::BAD_REQUEST
        }
        LinkTrackerError::InvalidNonce(_) | LinkTrackerError::PermissionDenied(_) => {
            StatusCode::FORBIDDEN
        }
        LinkTrackerError::NotFound(_) => StatusCode::NOT_FOUND,
        LinkTrackerError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
