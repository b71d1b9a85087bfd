//! Entity Commands - 通用写操作命令
//!
//! 所有资源共用；`actor` 为令牌中的 user_id，写入审计列

use crate::domain::FieldValue;

/// 创建一行
#[derive(Debug, Clone)]
pub struct CreateEntity<P> {
    pub payload: P,
    pub actor: i64,
}

/// 整体覆盖一行（未提供的字段写入 NULL）
#[derive(Debug, Clone)]
pub struct UpdateEntity<I, P> {
    pub id: I,
    pub payload: P,
    pub actor: i64,
}

/// 软删除一行
#[derive(Debug, Clone)]
pub struct DeleteEntity<I> {
    pub id: I,
    pub actor: i64,
}

/// 只修改部分列（不经过请求体校验）
#[derive(Debug, Clone)]
pub struct PatchEntity<I> {
    pub id: I,
    pub fields: Vec<(&'static str, FieldValue)>,
    pub actor: i64,
}

impl PatchEntity<i64> {
    /// 将销售单服务项标记为已治疗
    pub fn mark_service_treated(id: i64, actor: i64) -> Self {
        Self {
            id,
            fields: vec![("treated", FieldValue::Bool(Some(true)))],
            actor,
        }
    }
}

/// 创建带明细的单据
#[derive(Debug, Clone)]
pub struct CreateDocument<P> {
    pub payload: P,
    pub actor: i64,
}
