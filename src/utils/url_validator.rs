//! 目标地址校验与来源显示

use url::Url;

/// URL 校验错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    InvalidFormat(String),
    MissingHost,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "Destination URL cannot be empty"),
            Self::InvalidProtocol(scheme) => write!(
                f,
                "Unsupported protocol '{}': only http and https destinations are allowed",
                scheme
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid destination URL: {}", msg),
            Self::MissingHost => write!(f, "Destination URL has no host"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 校验跳转目标：非空、可解析、http(s)、带 host
///
/// 返回 `Url` 规范化后的形式：非 ASCII 字符已做百分号编码，可直接放进 Location 头
pub fn validate_destination(url: &str) -> Result<String, UrlValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(other.to_string())),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed.into())
}

/// 来源展示：空为 "Direct"，合法 URL 只显示 host，其他原样返回
pub fn referrer_display(referrer: &str) -> String {
    if referrer.is_empty() {
        return "Direct".to_string();
    }
    match Url::parse(referrer) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => referrer.to_string(),
        },
        Err(_) => referrer.to_string(),
    }
}
