//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use std::fmt::Display;
use thiserror::Error;

use crate::application::ports::{FieldError, RepositoryError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到（或已被软删除）
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 请求体字段校验失败
    #[error("Validation failed: {} field error(s)", errors.len())]
    ValidationError { errors: Vec<FieldError> },

    /// 非法输入（路径参数、查询参数）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 持久化操作失败，`detail` 为底层错误信息
    #[error("{message}")]
    OperationFailed {
        message: String,
        detail: Option<String>,
    },

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建校验错误
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::ValidationError { errors }
    }

    /// 创建非法输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 写操作失败：向调用方返回底层错误信息
    pub fn write_failed(message: impl Into<String>, err: RepositoryError) -> Self {
        let message = message.into();
        tracing::error!(error = %err, "{}", message);
        Self::OperationFailed {
            message,
            detail: Some(repository_detail(err)),
        }
    }

    /// 读操作失败：只记录日志，不向调用方暴露底层错误
    pub fn read_failed(message: impl Into<String>, err: RepositoryError) -> Self {
        let message = message.into();
        tracing::error!(error = %err, "{}", message);
        Self::OperationFailed {
            message,
            detail: None,
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

/// 取出底层错误信息（不带分类前缀）
fn repository_detail(err: RepositoryError) -> String {
    match err {
        RepositoryError::NotFound(msg)
        | RepositoryError::DatabaseError(msg)
        | RepositoryError::TransactionError(msg)
        | RepositoryError::SerializationError(msg) => msg,
        RepositoryError::LineInsertFailed { message, .. } => message,
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_keeps_raw_detail() {
        let err = ApplicationError::write_failed(
            "Failed to create sales order",
            RepositoryError::DatabaseError("CHECK constraint failed".to_string()),
        );
        match err {
            ApplicationError::OperationFailed { message, detail } => {
                assert_eq!(message, "Failed to create sales order");
                assert_eq!(detail.as_deref(), Some("CHECK constraint failed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_read_failed_hides_detail() {
        let err = ApplicationError::read_failed(
            "Failed to retrieve sales orders",
            RepositoryError::DatabaseError("disk I/O error".to_string()),
        );
        assert!(matches!(
            err,
            ApplicationError::OperationFailed { detail: None, .. }
        ));
    }
}
