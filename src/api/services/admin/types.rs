//! Admin API 请求/响应类型

use serde::{Deserialize, Deserializer, Serialize};

use super::error_code::ErrorCode;
use crate::analytics::DateRangeParams;

/// 统一响应包：`{success: true, data}` 或 `{success: false, error, code}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failure(error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code),
        }
    }
}

/// `POST /ajax` 的请求体，JSON 和表单共用
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AjaxRequest {
    pub action: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub date_range: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default, alias = "post_id", deserialize_with = "string_or_number")]
    pub link_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub destination_url: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
}

impl AjaxRequest {
    pub fn range_params(&self) -> DateRangeParams {
        DateRangeParams {
            date_range: self.date_range.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
        }
    }
}

/// 表单里所有值都是字符串，JSON 客户端可能直接发数字
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
        None => None,
    })
}

/// `GET /nonces` 的返回
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NonceBundle {
    pub dashboard: String,
    pub stats: String,
    pub create_link: String,
    pub reset_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ajax_request_accepts_numbers() {
        let req: AjaxRequest = serde_json::from_str(
            r#"{"action":"get_stats","nonce":"n","date_range":7,"post_id":42}"#,
        )
        .unwrap();
        assert_eq!(req.date_range.as_deref(), Some("7"));
        assert_eq!(req.link_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_failure_envelope_shape() {
        let json =
            serde_json::to_value(ApiEnvelope::<()>::failure("Invalid nonce", ErrorCode::NonceInvalid))
                .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid nonce");
        assert_eq!(json["code"], 2002);
        assert!(json.get("data").is_none());
    }
}
