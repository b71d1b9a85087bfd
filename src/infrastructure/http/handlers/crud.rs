//! Generic CRUD Handlers
//!
//! 所有资源共用的列表、详情、创建、更新、删除与按父级查询接口。
//! 每个请求基于租户连接池构建仓储，再交给应用层处理器。

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    http::StatusCode,
    Json,
};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::{
    CreateEntity, CreateEntityHandler, DeleteEntity, DeleteEntityHandler, GetEntity,
    GetEntityHandler, ListByParent, ListByParentHandler, ListEntities, ListEntitiesHandler,
    UpdateEntity, UpdateEntityHandler,
};
use crate::domain::{capitalize, Entity, Writable};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::{
    list_query, page, parse_id, CurrentUser, JsonBody, TenantDb,
};
use crate::infrastructure::persistence::{SqliteCrudRepository, SqliteEntity};

/// 可通过 HTTP 暴露的实体
pub trait Resource: SqliteEntity + for<'r> FromRow<'r, SqliteRow> {}

impl<T> Resource for T where T: SqliteEntity + for<'r> FromRow<'r, SqliteRow> {}

/// 当前租户的仓储
pub(super) fn repository<E: Resource>(db: &TenantDb) -> Arc<SqliteCrudRepository<E>> {
    Arc::new(SqliteCrudRepository::new(db.pool.clone()))
}

/// 查询串本身无法解析时的错误
pub(super) fn query_params(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<HashMap<String, String>, ApiError> {
    query.map(|Query(params)| params).map_err(|rejection| ApiError::BadRequest {
        message: "Invalid query parameter".to_string(),
        errors: Some(serde_json::Value::String(rejection.body_text())),
    })
}

pub(super) fn message<E: Entity>(action: &str) -> String {
    format!("{} {} successfully", capitalize(E::LABEL), action)
}

// ============================================================================
// Reads
// ============================================================================

/// GET / - 列出未删除的行
pub async fn list<E: Resource>(
    db: TenantDb,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<E>>>, ApiError> {
    let params = query_params(query)?;
    let query = list_query::<E>(&params)?;

    let handler = ListEntitiesHandler::<E>::new(repository::<E>(&db));
    let rows = handler.handle(ListEntities { query }).await?;

    Ok(Json(ApiResponse::success(
        format!("{} retrieved successfully", capitalize(E::LABEL_PLURAL)),
        rows,
    )))
}

/// GET /:id - 获取一行（包含已软删除的行）
pub async fn get<E: Resource>(
    db: TenantDb,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<E>>, ApiError> {
    let id = parse_id::<E>(&raw_id)?;

    let handler = GetEntityHandler::<E>::new(repository::<E>(&db));
    let row = handler.handle(GetEntity { id }).await?;

    Ok(Json(ApiResponse::success(message::<E>("retrieved"), row)))
}

/// GET /by-xxx/:parent_id - 按父级外键列出子资源
pub async fn by_parent<E: Resource>(
    db: TenantDb,
    Path(raw_parent): Path<String>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<E>>>, ApiError> {
    let parent_key = E::PARENT
        .ok_or_else(|| ApiError::internal(format!("{} has no parent key", E::TABLE)))?;
    let parent = parent_key
        .kind
        .parse(&raw_parent)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {} ID", parent_key.label)))?;
    let params = query_params(query)?;

    let handler = ListByParentHandler::<E>::new(repository::<E>(&db));
    let rows = handler
        .handle(ListByParent {
            parent,
            page: page(&params)?,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        format!("{} retrieved successfully", capitalize(E::LABEL_PLURAL)),
        rows,
    )))
}

// ============================================================================
// Writes
// ============================================================================

/// POST / - 创建一行，返回 201
pub async fn create<E: Resource + Writable>(
    db: TenantDb,
    user: CurrentUser,
    JsonBody(payload): JsonBody<E::Payload>,
) -> Result<(StatusCode, Json<ApiResponse<E>>), ApiError> {
    let handler = CreateEntityHandler::<E>::new(repository::<E>(&db));
    let row = handler
        .handle(CreateEntity {
            payload,
            actor: user.user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(message::<E>("created"), row)),
    ))
}

/// PUT /:id - 整体覆盖一行
pub async fn update<E: Resource + Writable>(
    db: TenantDb,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    JsonBody(payload): JsonBody<E::Payload>,
) -> Result<Json<ApiResponse<E>>, ApiError> {
    let id = parse_id::<E>(&raw_id)?;

    let handler = UpdateEntityHandler::<E>::new(repository::<E>(&db));
    let row = handler
        .handle(UpdateEntity {
            id,
            payload,
            actor: user.user_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(message::<E>("updated"), row)))
}

/// DELETE /:id - 软删除，`data` 为 null
pub async fn delete<E: Resource>(
    db: TenantDb,
    user: CurrentUser,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_id::<E>(&raw_id)?;

    let handler = DeleteEntityHandler::<E>::new(repository::<E>(&db));
    handler
        .handle(DeleteEntity {
            id,
            actor: user.user_id,
        })
        .await?;

    Ok(Json(ApiResponse::<()>::message(message::<E>("deleted"))))
}
