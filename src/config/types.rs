//! Configuration Types
//!
//! 定义所有配置结构体

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置（每个租户一个 SQLite 库）
    #[serde(default)]
    pub database: DatabaseConfig,

    /// JWT 配置
    #[serde(default)]
    pub jwt: JwtConfig,

    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,

    /// 限流配置
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// 租户配置
    #[serde(default)]
    pub tenancy: TenancyConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 单个请求的超时时间（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// 优雅关闭的最长等待时间（秒）
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_request_timeout() -> u64 {
    10
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 租户数据库文件所在目录，文件名为 `{tenant}.db`
    #[serde(default = "default_db_dir")]
    pub dir: PathBuf,

    /// 每个租户连接池的最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// 使用内存数据库（测试用）
    #[serde(default)]
    pub in_memory: bool,
}

fn default_db_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dir: default_db_dir(),
            max_connections: default_max_connections(),
            in_memory: false,
        }
    }
}

impl DatabaseConfig {
    /// 获取租户数据库 URL
    pub fn tenant_url(&self, tenant_code: &str) -> String {
        if self.in_memory {
            "sqlite::memory:".to_string()
        } else {
            format!(
                "sqlite:{}?mode=rwc",
                self.dir.join(format!("{}.db", tenant_code)).display()
            )
        }
    }
}

/// JWT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC 签名密钥
    #[serde(default = "default_jwt_secret")]
    pub secret: String,

    /// Access token 有效期（秒）
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,

    /// Refresh token 有效期（秒）
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,

    /// 签发者
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_jwt_secret() -> String {
    "change-me".to_string()
}

fn default_access_ttl() -> i64 {
    15 * 60
}

fn default_refresh_ttl() -> i64 {
    7 * 24 * 3600
}

fn default_issuer() -> String {
    "pos-mojosoft".to_string()
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            issuer: default_issuer(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_origins", deserialize_with = "comma_list")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_methods", deserialize_with = "comma_list")]
    pub allowed_methods: Vec<String>,

    #[serde(default = "default_headers", deserialize_with = "comma_list")]
    pub allowed_headers: Vec<String>,
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_methods() -> Vec<String> {
    split_list("GET,POST,PUT,PATCH,DELETE,OPTIONS")
}

fn default_headers() -> Vec<String> {
    split_list("Origin,Content-Type,Accept,Authorization,X-Tenant-Code")
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allowed_methods: default_methods(),
            allowed_headers: default_headers(),
        }
    }
}

impl CorsConfig {
    /// 是否允许任意来源
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 输出格式
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// 日志文件目录，设置后按天写入 `so-service-YYYY-MM-DD.log`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: None,
        }
    }
}

/// 限流配置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// 每分钟补充的请求数
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,

    /// 桶容量（突发请求数）
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_rpm() -> u32 {
    60
}

fn default_burst() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_rpm(),
            burst: default_burst(),
        }
    }
}

/// 租户配置
#[derive(Debug, Clone, Deserialize)]
pub struct TenancyConfig {
    /// 允许的租户编码列表（逗号分隔）
    #[serde(default = "default_tenant_codes", deserialize_with = "comma_list")]
    pub codes: Vec<String>,
}

fn default_tenant_codes() -> Vec<String> {
    vec!["alana".to_string()]
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            codes: default_tenant_codes(),
        }
    }
}

// ============================================================================
// 列表解析
// ============================================================================

/// 按逗号切分并去除空白项
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 同时接受 "a,b" 字符串与 ["a", "b"] 数组两种写法
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::One(s) => split_list(&s),
        Raw::Many(items) => items
            .iter()
            .flat_map(|item| split_list(item))
            .collect(),
    })
}
