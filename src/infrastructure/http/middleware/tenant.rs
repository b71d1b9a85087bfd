//! Tenant Middleware
//!
//! 按 X-Tenant-Code 选择租户数据库

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::TenantDb;
use crate::infrastructure::http::state::AppState;

pub const TENANT_HEADER: &str = "X-Tenant-Code";

/// 租户中间件：缺失或未配置的租户代码返回 400
pub async fn tenant_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let code = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    if code.is_empty() {
        return Err(ApiError::bad_request(
            "tenant code is required in X-Tenant-Code header",
        ));
    }

    let pool = state
        .registry
        .get(&code)
        .await
        .ok_or_else(|| ApiError::bad_request("invalid tenant code"))?;

    tracing::debug!(tenant = %code, "Tenant resolved");
    request.extensions_mut().insert(TenantDb { code, pool });

    Ok(next.run(request).await)
}
