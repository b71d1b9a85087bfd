//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod document_handlers;
mod entity_handlers;

pub use document_handlers::*;
pub use entity_handlers::*;
