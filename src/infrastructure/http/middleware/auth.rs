//! Authentication Middleware
//!
//! Bearer JWT 校验；令牌中的租户必须与请求租户一致

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::{CurrentUser, TenantDb};
use crate::infrastructure::http::state::AppState;

fn unauthorized(message: &str) -> ApiError {
    ApiError::Unauthorized(message.to_string())
}

/// 认证中间件（需在租户中间件之后运行）
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default())
        .unwrap_or_default();

    if header.is_empty() {
        return Err(unauthorized("Authorization header required"));
    }

    let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => token.to_string(),
        _ => return Err(unauthorized("Invalid authorization header format")),
    };

    let claims = state.jwt.validate_access_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        unauthorized("Invalid or expired token")
    })?;

    if let Some(tenant) = request.extensions().get::<TenantDb>() {
        if tenant.code != claims.tenant_code {
            tracing::warn!(
                tenant = %tenant.code,
                token_tenant = %claims.tenant_code,
                user_id = claims.user_id,
                "Token used against another tenant"
            );
            return Err(ApiError::Forbidden(
                "Token is not valid for this tenant".to_string(),
            ));
        }
    }

    request
        .extensions_mut()
        .insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

/// 路由所需的权限
#[derive(Debug, Clone, Copy)]
pub struct RequiredPermission(pub &'static str);

/// 权限校验中间件
///
/// 用法：`.route_layer(from_fn_with_state(RequiredPermission("x"), require_permission))`
pub async fn require_permission(
    State(RequiredPermission(permission)): State<RequiredPermission>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::Forbidden("No permissions found".to_string()))?;

    if user.permissions.is_empty() {
        return Err(ApiError::Forbidden("No permissions found".to_string()));
    }
    if !user.has_permission(permission) {
        tracing::warn!(user_id = user.user_id, permission, "Permission denied");
        return Err(ApiError::Forbidden("Insufficient permissions".to_string()));
    }

    Ok(next.run(request).await)
}
