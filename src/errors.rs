use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkTrackerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Serialization(String),
    DateParse(String),
    InvalidNonce(String),
    PermissionDenied(String),
}

impl LinkTrackerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkTrackerError::DatabaseConfig(_) => "E001",
            LinkTrackerError::DatabaseConnection(_) => "E002",
            LinkTrackerError::DatabaseOperation(_) => "E003",
            LinkTrackerError::FileOperation(_) => "E004",
            LinkTrackerError::Validation(_) => "E005",
            LinkTrackerError::NotFound(_) => "E006",
            LinkTrackerError::Conflict(_) => "E007",
            LinkTrackerError::Serialization(_) => "E008",
            LinkTrackerError::DateParse(_) => "E009",
            LinkTrackerError::InvalidNonce(_) => "E010",
            LinkTrackerError::PermissionDenied(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkTrackerError::DatabaseConfig(_) => "Database Configuration Error",
            LinkTrackerError::DatabaseConnection(_) => "Database Connection Error",
            LinkTrackerError::DatabaseOperation(_) => "Database Operation Error",
            LinkTrackerError::FileOperation(_) => "File Operation Error",
            LinkTrackerError::Validation(_) => "Validation Error",
            LinkTrackerError::NotFound(_) => "Resource Not Found",
            LinkTrackerError::Conflict(_) => "Conflict",
            LinkTrackerError::Serialization(_) => "Serialization Error",
            LinkTrackerError::DateParse(_) => "Date Parse Error",
            LinkTrackerError::InvalidNonce(_) => "Invalid Nonce",
            LinkTrackerError::PermissionDenied(_) => "Permission Denied",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkTrackerError::DatabaseConfig(msg)
            | LinkTrackerError::DatabaseConnection(msg)
            | LinkTrackerError::DatabaseOperation(msg)
            | LinkTrackerError::FileOperation(msg)
            | LinkTrackerError::Validation(msg)
            | LinkTrackerError::NotFound(msg)
            | LinkTrackerError::Conflict(msg)
            | LinkTrackerError::Serialization(msg)
            | LinkTrackerError::DateParse(msg)
            | LinkTrackerError::InvalidNonce(msg)
            | LinkTrackerError::PermissionDenied(msg) => msg,
        }
    }

    /// 彩色输出（Server 启动失败时使用）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 简洁输出（CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkTrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkTrackerError {}

// 便捷的构造函数
impl LinkTrackerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::DateParse(msg.into())
    }

    pub fn invalid_nonce<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::InvalidNonce(msg.into())
    }

    pub fn permission_denied<T: Into<String>>(msg: T) -> Self {
        LinkTrackerError::PermissionDenied(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkTrackerError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkTrackerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkTrackerError {
    fn from(err: std::io::Error) -> Self {
        LinkTrackerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkTrackerError {
    fn from(err: serde_json::Error) -> Self {
        LinkTrackerError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkTrackerError {
    fn from(err: chrono::ParseError) -> Self {
        LinkTrackerError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkTrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let all = [
            LinkTrackerError::database_config(""),
            LinkTrackerError::database_connection(""),
            LinkTrackerError::database_operation(""),
            LinkTrackerError::file_operation(""),
            LinkTrackerError::validation(""),
            LinkTrackerError::not_found(""),
            LinkTrackerError::conflict(""),
            LinkTrackerError::serialization(""),
            LinkTrackerError::date_parse(""),
            LinkTrackerError::invalid_nonce(""),
            LinkTrackerError::permission_denied(""),
        ];
        let mut codes: Vec<_> = all.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_format_simple() {
        let err = LinkTrackerError::validation("Missing required fields");
        assert_eq!(err.format_simple(), "Validation Error: Missing required fields");
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_from_chrono_parse_error() {
        let parse_err = chrono::NaiveDate::parse_from_str("2025-13-01", "%Y-%m-%d").unwrap_err();
        let err: LinkTrackerError = parse_err.into();
        assert_eq!(err.code(), "E009");
    }
}
