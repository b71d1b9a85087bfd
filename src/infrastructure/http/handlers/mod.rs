//! HTTP Handlers
//!
//! - crud: 通用资源接口（按实体类型实例化）
//! - documents: 单据组合创建、服务项标记
//! - health: 健康检查

mod crud;
mod documents;
mod health;

pub use crud::*;
pub use documents::*;
pub use health::*;
