//! Data Transfer Objects
//!
//! 所有接口（包括错误）使用同一个响应信封

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// 成功但无数据（`data: null`）
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// 错误响应
    pub fn error(message: impl Into<String>, errors: Option<Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }
}

// ============================================================================
// Health DTOs
// ============================================================================

/// 健康检查数据
#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub service: &'static str,
    pub tenants: Vec<TenantStatus>,
}

#[derive(Debug, Serialize)]
pub struct TenantStatus {
    pub code: String,
    pub status: &'static str,
}
