//! Request Extractors
//!
//! 中间件写入请求扩展的租户连接池与调用者身份，以及请求体 / 查询参数解析

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use super::error::ApiError;
use crate::application::ports::{ListQuery, Page};
use crate::domain::{Entity, EntityId};
use crate::infrastructure::auth::Claims;
use crate::infrastructure::persistence::DbPool;

// ============================================================================
// TenantDb
// ============================================================================

/// 当前请求的租户数据库
#[derive(Clone)]
pub struct TenantDb {
    pub code: String,
    pub pool: DbPool,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for TenantDb {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantDb>()
            .cloned()
            .ok_or_else(|| ApiError::internal("Tenant database not resolved"))
    }
}

// ============================================================================
// CurrentUser
// ============================================================================

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub name: String,
    pub role_id: i64,
    pub tenant_code: String,
    pub id_location: Option<i64>,
    pub permissions: Vec<String>,
}

impl CurrentUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            name: claims.name,
            role_id: claims.role_id,
            tenant_code: claims.tenant_code,
            id_location: claims.id_location,
            permissions: claims.permissions,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authorization header required".to_string()))
    }
}

// ============================================================================
// JsonBody
// ============================================================================

/// JSON 请求体；解析失败返回 400 "Invalid request body"
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_body(rejection)),
        }
    }
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest {
        message: "Invalid request body".to_string(),
        errors: Some(Value::String(rejection.body_text())),
    }
}

// ============================================================================
// Path & query parsing
// ============================================================================

/// 解析路径中的主键
pub fn parse_id<E: Entity>(raw: &str) -> Result<E::Id, ApiError> {
    E::Id::parse(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid {} ID", E::ID_LABEL)))
}

fn invalid_param(name: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid query parameter: {}", name))
}

const DEFAULT_PAGE_SIZE: u32 = 20;

fn parse_positive(params: &HashMap<String, String>, name: &str) -> Result<Option<u32>, ApiError> {
    match params.get(name).map(|raw| raw.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) if value > 0 => Ok(Some(value)),
            _ => Err(invalid_param(name)),
        },
    }
}

/// 由查询参数构建列表条件：只识别实体声明的过滤参数，空值忽略
pub fn list_query<E: Entity>(params: &HashMap<String, String>) -> Result<ListQuery, ApiError> {
    let mut filters = Vec::new();
    for spec in E::FILTERS {
        let Some(raw) = params.get(spec.param) else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }
        let value = spec.kind.parse(raw).ok_or_else(|| invalid_param(spec.param))?;
        filters.push(spec.bind(value));
    }

    Ok(ListQuery::new(filters).with_page(page(params)?))
}

/// 分页参数：`page` 或 `limit` 任一出现即分页
pub fn page(params: &HashMap<String, String>) -> Result<Option<Page>, ApiError> {
    let number = parse_positive(params, "page")?;
    let size = parse_positive(params, "limit")?;

    if number.is_none() && size.is_none() {
        return Ok(None);
    }

    Ok(Some(Page {
        number: number.unwrap_or(1),
        size: size.unwrap_or(DEFAULT_PAGE_SIZE),
    }))
}
