//! Application State
//!
//! 所有请求共享的状态：租户注册表、JWT 服务、限流器

use std::sync::Arc;

use super::middleware::RateLimiter;
use crate::config::AppConfig;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::tenancy::TenantRegistry;

/// 应用状态
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<TenantRegistry>,
    pub jwt: JwtService,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// 创建应用状态
    pub fn new(config: AppConfig, registry: Arc<TenantRegistry>) -> Self {
        let jwt = JwtService::new(&config.jwt);
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Self {
            config,
            registry,
            jwt,
            rate_limiter,
        }
    }
}
