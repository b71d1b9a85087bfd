//! HTTP Middleware
//!
//! - logging: 请求日志（4xx 记 warn，5xx 记 error）
//! - tenant: 解析 X-Tenant-Code，附加租户连接池
//! - auth: 校验 Bearer JWT，附加调用者身份；权限校验
//! - rate_limit: 按客户端地址的令牌桶限流

mod auth;
mod logging;
mod rate_limit;
mod tenant;

pub use auth::{auth_middleware, require_permission, RequiredPermission};
pub use logging::request_logging_middleware;
pub use rate_limit::{client_ip, rate_limit_middleware, RateLimiter};
pub use tenant::{tenant_middleware, TENANT_HEADER};
