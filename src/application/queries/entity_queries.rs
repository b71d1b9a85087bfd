//! Entity Queries - 通用读操作查询

use crate::application::ports::{ListQuery, Page};
use crate::domain::FieldValue;

/// 列出未删除的行
#[derive(Debug, Clone, Default)]
pub struct ListEntities {
    pub query: ListQuery,
}

/// 按主键获取一行（包含已软删除的行）
#[derive(Debug, Clone)]
pub struct GetEntity<I> {
    pub id: I,
}

/// 按父级外键列出子资源
#[derive(Debug, Clone)]
pub struct ListByParent {
    pub parent: FieldValue,
    pub page: Option<Page>,
}
