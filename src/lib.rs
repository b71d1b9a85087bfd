//! so-service - POS 销售单服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 销售单、应收款收据、疗程、账簿与字典表的表模型
//! - Entity / Payload trait：主键、过滤参数、请求体校验
//!
//! 应用层 (application/):
//! - Ports: 通用 CRUD 仓储与单据仓储
//! - Commands: 创建、更新、删除、单据组合创建
//! - Queries: 列表、详情、按父级查询
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（租户、认证、限流中间件）
//! - Persistence: SQLite，每个租户一个库
//! - Tenancy: 租户连接池注册表
//! - Auth: JWT

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

pub use config::{load_config, AppConfig};
