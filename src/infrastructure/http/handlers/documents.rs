//! Document Handlers
//!
//! 单据（销售单、应收款收据、疗程）的组合创建，以及服务项标记已治疗

use axum::{extract::Path, http::StatusCode, Json};
use uuid::Uuid;

use super::crud::{message, repository, Resource};
use crate::application::{CreateDocument, CreateDocumentHandler, PatchEntity, PatchEntityHandler};
use crate::domain::{DocumentPayload, SalesOrderService, Writable};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::{parse_id, CurrentUser, JsonBody, TenantDb};

/// POST / - 父表与明细在同一事务中创建
pub async fn create_document<E>(
    db: TenantDb,
    user: CurrentUser,
    JsonBody(payload): JsonBody<E::Payload>,
) -> Result<(StatusCode, Json<ApiResponse<E>>), ApiError>
where
    E: Resource + Writable<Id = Uuid>,
    E::Payload: DocumentPayload,
{
    let repo = repository::<E>(&db);
    let handler = CreateDocumentHandler::<E>::new(repo.clone(), repo);
    let row = handler
        .handle(CreateDocument {
            payload,
            actor: user.user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(message::<E>("created"), row)),
    ))
}

/// PATCH /:id/mark-treated
pub async fn mark_treated(
    db: TenantDb,
    user: CurrentUser,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<SalesOrderService>>, ApiError> {
    let id = parse_id::<SalesOrderService>(&raw_id)?;

    let handler =
        PatchEntityHandler::<SalesOrderService>::new(repository::<SalesOrderService>(&db));
    let service = handler
        .handle(PatchEntity::mark_service_treated(id, user.user_id))
        .await?;

    Ok(Json(ApiResponse::success(
        "Service marked as treated successfully",
        service,
    )))
}
