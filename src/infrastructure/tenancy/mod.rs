//! Tenancy - 多租户数据库注册表

mod registry;

pub use registry::{TenantError, TenantHealth, TenantRegistry};
