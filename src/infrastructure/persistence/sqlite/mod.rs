//! SQLite Persistence - SQLite 数据库持久化实现

mod crud_repo;
mod database;
mod relations;

pub use crud_repo::*;
pub use database::*;
pub use relations::SqliteEntity;
