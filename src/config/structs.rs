use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数
/// - database: 数据库连接
/// - logging: 日志
/// - routes: 路由前缀
/// - auth: 管理端 token 与 nonce
/// - tracker: 跳转与站点时区
/// - demo: 演示数据时间窗口
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl StaticConfig {
    /// 从 config.toml 和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LT，分隔符：__
    /// 示例：LT__SERVER__PORT=9999
    pub fn load() -> Self {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LT")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 路由前缀
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
    /// 短链接前缀，`/go/<code>` 中的 `go`
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
}

/// 管理端认证
///
/// admin_token 拥有全部权限；editor_token 只能创建链接。
/// admin_token 为空时管理接口整体关闭（返回 404）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub admin_token: String,
    #[serde(default)]
    pub editor_token: String,
    #[serde(default = "default_nonce_ttl_secs")]
    pub nonce_ttl_secs: u64,
}

/// 跳转与统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// 用于拼接 short_url
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// 站点时区偏移，例如 "+08:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_short_code_length")]
    pub short_code_length: usize,
    #[serde(default = "default_redirect_status")]
    pub redirect_status: u16,
    #[serde(default)]
    pub trust_proxy_headers: bool,
    #[serde(default = "default_visitor_cookie")]
    pub visitor_cookie: String,
}

impl TrackerConfig {
    /// 解析站点时区；非法值退回 UTC
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset
            .parse::<FixedOffset>()
            .unwrap_or_else(|_| Utc.fix())
    }

    /// 站点本地时间
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset()).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    pub fn short_url(&self, link_prefix: &str, short_code: &str) -> String {
        format!(
            "{}/{}/{}",
            self.site_url.trim_end_matches('/'),
            link_prefix.trim_matches('/'),
            short_code
        )
    }
}

/// 演示数据窗口（闭区间）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_demo_start")]
    pub window_start: NaiveDate,
    #[serde(default = "default_demo_end")]
    pub window_end: NaiveDate,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "linktracker.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

fn default_link_prefix() -> String {
    "go".to_string()
}

fn default_nonce_ttl_secs() -> u64 {
    12 * 60 * 60
}

fn default_site_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_short_code_length() -> usize {
    6
}

fn default_redirect_status() -> u16 {
    302
}

fn default_visitor_cookie() -> String {
    "lt_visitor".to_string()
}

fn default_demo_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 27).unwrap_or_default()
}

fn default_demo_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 11).unwrap_or_default()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            admin_prefix: default_admin_prefix(),
            health_prefix: default_health_prefix(),
            link_prefix: default_link_prefix(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            editor_token: String::new(),
            nonce_ttl_secs: default_nonce_ttl_secs(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            utc_offset: default_utc_offset(),
            short_code_length: default_short_code_length(),
            redirect_status: default_redirect_status(),
            trust_proxy_headers: false,
            visitor_cookie: default_visitor_cookie(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_start: default_demo_start(),
            window_end: default_demo_end(),
        }
    }
}
