//! Audit Fields
//!
//! 每张业务表都带有的审计字段：操作人与时间戳。
//! `deleted_at` 非空即表示该行已被软删除。

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 审计字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct Audit {
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub deleted_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Audit {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
