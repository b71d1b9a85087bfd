//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "SO_SERVICE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SO_SERVICE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SO_SERVICE_SERVER__PORT=8082`
/// - `SO_SERVICE_JWT__SECRET=...`
/// - `SO_SERVICE_TENANCY__CODES=alana,beta`
/// - `SO_SERVICE_RATE_LIMIT__REQUESTS_PER_MINUTE=120`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8082)?
        .set_default("server.request_timeout_secs", 10)?
        .set_default("server.shutdown_timeout_secs", 30)?
        .set_default("database.dir", "data")?
        .set_default("database.max_connections", 5)?
        .set_default("database.in_memory", false)?
        .set_default("jwt.secret", "change-me")?
        .set_default("jwt.access_ttl_secs", 15 * 60)?
        .set_default("jwt.refresh_ttl_secs", 7 * 24 * 3600)?
        .set_default("jwt.issuer", "pos-mojosoft")?
        .set_default("cors.allowed_origins", "*")?
        .set_default("cors.allowed_methods", "GET,POST,PUT,PATCH,DELETE,OPTIONS")?
        .set_default(
            "cors.allowed_headers",
            "Origin,Content-Type,Accept,Authorization,X-Tenant-Code",
        )?
        .set_default("log.level", "info")?
        .set_default("log.format", "json")?
        .set_default("rate_limit.requests_per_minute", 60)?
        .set_default("rate_limit.burst", 10)?
        .set_default("tenancy.codes", "alana")?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: SO_SERVICE_JWT__SECRET=secret
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub(crate) fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.jwt.secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "JWT secret cannot be empty".to_string(),
        ));
    }

    if config.jwt.issuer.is_empty() {
        return Err(ConfigError::ValidationError(
            "JWT issuer cannot be empty".to_string(),
        ));
    }

    if config.jwt.access_ttl_secs <= 0 || config.jwt.refresh_ttl_secs <= 0 {
        return Err(ConfigError::ValidationError(
            "JWT token TTLs must be positive".to_string(),
        ));
    }

    if config.tenancy.codes.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one tenant code must be configured".to_string(),
        ));
    }

    if config.rate_limit.requests_per_minute == 0 || config.rate_limit.burst == 0 {
        return Err(ConfigError::ValidationError(
            "Rate limit requests_per_minute and burst must be greater than 0".to_string(),
        ));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "Database max_connections cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Request Timeout: {}s", config.server.request_timeout_secs);
    if config.database.in_memory {
        tracing::info!("Database: in-memory");
    } else {
        tracing::info!("Database Directory: {}", config.database.dir.display());
    }
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Tenants: {}", config.tenancy.codes.join(", "));
    tracing::info!("JWT Issuer: {}", config.jwt.issuer);
    tracing::info!("JWT Access TTL: {}s", config.jwt.access_ttl_secs);
    tracing::info!("CORS Origins: {}", config.cors.allowed_origins.join(", "));
    tracing::info!(
        "Rate Limit: {} rpm, burst {}",
        config.rate_limit.requests_per_minute,
        config.rate_limit.burst
    );
    tracing::info!("Log Level: {} ({:?})", config.log.level, config.log.format);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_secret() {
        let mut config = AppConfig::default();
        config.jwt.secret = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_no_tenants() {
        let mut config = AppConfig::default();
        config.tenancy.codes.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_burst() {
        let mut config = AppConfig::default();
        config.rate_limit.burst = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 9090

            [tenancy]
            codes = "alana, beta"

            [log]
            format = "text"
            "#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.tenancy.codes, vec!["alana", "beta"]);
        assert_eq!(config.log.format, crate::config::LogFormat::Text);
        assert_eq!(config.jwt.issuer, "pos-mojosoft");
    }
}
