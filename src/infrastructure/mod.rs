//! Infrastructure Layer - 基础设施层
//!
//! - auth: JWT 签发与校验
//! - http: REST 接口、中间件、服务器
//! - persistence: SQLite 仓储（每个租户一个库）
//! - tenancy: 租户连接池注册表

pub mod auth;
pub mod http;
pub mod persistence;
pub mod tenancy;

pub use auth::JwtService;
pub use http::{AppState, HttpServer};
pub use tenancy::TenantRegistry;
