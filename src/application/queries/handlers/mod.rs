//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod entity_handlers;

pub use entity_handlers::*;
