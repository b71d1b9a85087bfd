//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod repositories;

pub use crate::domain::{
    capitalize, require, validate_nested, DocumentPayload, Entity, EntityId, FieldError,
    FieldKind, FieldValue, Fields, Filter, FilterOp, FilterSpec, LineSet, ParentKey, Payload,
    Writable,
};
pub use repositories::{
    CrudRepositoryPort, DocumentRepositoryPort, ListQuery, NewDocument, Page, RepositoryError,
    Visibility,
};
