//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite，每个租户一个库）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Entity, Fields, Filter, LineSet};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 单据明细插入失败（整个事务已回滚）
    #[error("Failed to insert {label}: {message}")]
    LineInsertFailed {
        label: &'static str,
        message: String,
    },

    /// 事务开启或提交失败
    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Query options
// ============================================================================

/// 按主键读取时是否包含已软删除的行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// 仅未删除的行
    Live,
    /// 包含已删除的行
    IncludeDeleted,
}

/// 分页参数（页码从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn offset(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
    }
}

/// 列表查询条件
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub page: Option<Page>,
}

impl ListQuery {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            page: None,
        }
    }

    pub fn with_page(mut self, page: Option<Page>) -> Self {
        self.page = page;
        self
    }
}

// ============================================================================
// CRUD Repository
// ============================================================================

/// 通用 CRUD Repository Port
///
/// 所有写操作都记录操作人；删除为软删除
#[async_trait]
pub trait CrudRepositoryPort<E: Entity>: Send + Sync {
    /// 查询未删除的行（附带关联数据）
    async fn find_all(&self, query: &ListQuery) -> Result<Vec<E>, RepositoryError>;

    /// 根据 ID 查找
    async fn find_by_id(
        &self,
        id: E::Id,
        visibility: Visibility,
    ) -> Result<Option<E>, RepositoryError>;

    /// 插入一行，返回主键
    async fn insert(&self, fields: Fields, actor: i64) -> Result<E::Id, RepositoryError>;

    /// 覆盖给定的列
    async fn update(&self, id: E::Id, fields: Fields, actor: i64) -> Result<(), RepositoryError>;

    /// 软删除
    async fn soft_delete(&self, id: E::Id, actor: i64) -> Result<(), RepositoryError>;
}

// ============================================================================
// Document Repository
// ============================================================================

/// 带明细的新单据
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub header: Fields,
    pub lines: Vec<LineSet>,
}

/// 单据 Repository Port：父表与明细在同一事务中写入，任一失败则全部回滚
#[async_trait]
pub trait DocumentRepositoryPort<E: Entity>: Send + Sync {
    async fn insert_document(
        &self,
        document: NewDocument,
        actor: i64,
    ) -> Result<E::Id, RepositoryError>;
}
