//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（通用 CRUD / 单据 Repository）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Commands
    CreateDocument,
    CreateEntity,
    DeleteEntity,
    PatchEntity,
    UpdateEntity,
    // Handlers
    handlers::{
        CreateDocumentHandler, CreateEntityHandler, DeleteEntityHandler, PatchEntityHandler,
        UpdateEntityHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    CrudRepositoryPort, DocumentRepositoryPort, ListQuery, NewDocument, Page, RepositoryError,
    Visibility,
};

pub use queries::{
    // Queries
    GetEntity,
    ListByParent,
    ListEntities,
    // Handlers
    handlers::{GetEntityHandler, ListByParentHandler, ListEntitiesHandler},
};
