//! Persistence Layer - 数据持久化
//!
//! SQLite 存储实现（每个租户一个数据库）

pub mod sqlite;

pub use self::sqlite::{create_pool, run_migrations, DbPool, SqliteCrudRepository, SqliteEntity};
