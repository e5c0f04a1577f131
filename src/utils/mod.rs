pub mod ip;
pub mod url_validator;

/// 短码字符表：0-9a-zA-Z
const SHORT_CODE_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 短码允许的最大长度
pub const MAX_SHORT_CODE_LENGTH: usize = 64;

pub fn generate_random_code(length: usize) -> String {
    std::iter::repeat_with(|| SHORT_CODE_CHARS[rand::random_range(0..SHORT_CODE_CHARS.len())] as char)
        .take(length)
        .collect()
}

/// 短码只能由 ASCII 字母数字组成
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// 32 位十六进制访客 ID
pub fn generate_visitor_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn is_valid_visitor_id(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
