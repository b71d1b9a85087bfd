//! HTTP Routes
//!
//! API Endpoints（`/so/api` 下均需 X-Tenant-Code 与 Bearer 令牌）:
//! - /sales-order-status                        GET   字典（只读）
//! - /sales-orders                              CRUD  POST 组合创建明细与服务项
//! - /sales-order-services                      CRUD  PATCH /:id/mark-treated
//! - /sales-order-details                       CRUD  GET /by-sales-order/:id
//! - /reminded                                  GET   字典（只读）
//! - /ar-receipts                               CRUD  POST 组合创建明细
//! - /ar-receipt-details                        CRUD  GET /by-ar-receipt/:id
//! - /treatments                                CRUD  POST 组合创建明细
//! - /treatment-details                         CRUD  GET /by-treatment/:id
//! - /summary-by-transaction-type               CRUD  GET /by-bookkeeping/:id
//! - /summary-by-payment-method                 CRUD  GET /by-bookkeeping/:id
//! - /summary-by-transaction-type-and-payment-method  CRUD  GET /by-bookkeeping/:id
//! - /bookkeeping                               CRUD  GET /by-location/:id
//! - /bookkeeping-detail                        CRUD  GET /by-bookkeeping/:id
//! - /bookkeeping-status                        GET   字典（只读）
//! - /book-transaction-type                     CRUD
//! - /book-transaction-category                 CRUD
//! - /payment-method                            CRUD
//!
//! `/health` 不经过租户与认证中间件。未匹配的路径与方法同样返回响应信封。

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApiError;
use super::handlers::{self, Resource};
use super::middleware::{auth_middleware, tenant_middleware};
use super::state::AppState;
use crate::domain::{
    ArReceipt, ArReceiptDetail, BookTransactionCategory, BookTransactionType, Bookkeeping,
    BookkeepingDetail, BookkeepingStatus, DocumentPayload, PaymentMethod, Reminded, SalesOrder,
    SalesOrderDetail, SalesOrderService, SalesOrderStatus, SummaryByPaymentMethod,
    SummaryByTransactionType, SummaryByTransactionTypeAndPaymentMethod, Treatment,
    TreatmentDetail, Writable,
};

/// 创建所有路由
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/so/api", api_routes(state.clone()))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

/// 业务路由：先解析租户，再校验令牌
fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/sales-order-status", read_only::<SalesOrderStatus>())
        .nest("/sales-orders", documents::<SalesOrder>())
        .nest(
            "/sales-order-services",
            crud::<SalesOrderService>().route("/:id/mark-treated", patch(handlers::mark_treated)),
        )
        .nest(
            "/sales-order-details",
            crud::<SalesOrderDetail>().route(
                "/by-sales-order/:sales_order_id",
                get(handlers::by_parent::<SalesOrderDetail>),
            ),
        )
        .nest("/reminded", read_only::<Reminded>())
        .nest("/ar-receipts", documents::<ArReceipt>())
        .nest(
            "/ar-receipt-details",
            crud::<ArReceiptDetail>().route(
                "/by-ar-receipt/:ar_receipt_id",
                get(handlers::by_parent::<ArReceiptDetail>),
            ),
        )
        .nest("/treatments", documents::<Treatment>())
        .nest(
            "/treatment-details",
            crud::<TreatmentDetail>().route(
                "/by-treatment/:treatment_id",
                get(handlers::by_parent::<TreatmentDetail>),
            ),
        )
        .nest(
            "/summary-by-transaction-type",
            by_bookkeeping::<SummaryByTransactionType>(),
        )
        .nest(
            "/summary-by-payment-method",
            by_bookkeeping::<SummaryByPaymentMethod>(),
        )
        .nest(
            "/summary-by-transaction-type-and-payment-method",
            by_bookkeeping::<SummaryByTransactionTypeAndPaymentMethod>(),
        )
        .nest(
            "/bookkeeping",
            crud::<Bookkeeping>().route(
                "/by-location/:location_id",
                get(handlers::by_parent::<Bookkeeping>),
            ),
        )
        .nest("/bookkeeping-detail", by_bookkeeping::<BookkeepingDetail>())
        .nest("/bookkeeping-status", read_only::<BookkeepingStatus>())
        .nest("/book-transaction-type", crud::<BookTransactionType>())
        .nest("/book-transaction-category", crud::<BookTransactionCategory>())
        .nest("/payment-method", crud::<PaymentMethod>())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(from_fn_with_state(state, tenant_middleware))
}

/// GET / 与 GET /:id
fn read_only<E: Resource>() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list::<E>))
        .route("/:id", get(handlers::get::<E>))
}

/// 完整 CRUD
fn crud<E: Resource + Writable>() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list::<E>).post(handlers::create::<E>))
        .route(
            "/:id",
            get(handlers::get::<E>)
                .put(handlers::update::<E>)
                .delete(handlers::delete::<E>),
        )
}

/// CRUD，POST 为组合创建
fn documents<E>() -> Router<Arc<AppState>>
where
    E: Resource + Writable<Id = Uuid>,
    E::Payload: DocumentPayload,
{
    Router::new()
        .route(
            "/",
            get(handlers::list::<E>).post(handlers::create_document::<E>),
        )
        .route(
            "/:id",
            get(handlers::get::<E>)
                .put(handlers::update::<E>)
                .delete(handlers::delete::<E>),
        )
}

/// 账簿子表：CRUD + GET /by-bookkeeping/:bookkeeping_id
fn by_bookkeeping<E: Resource + Writable>() -> Router<Arc<AppState>> {
    crud::<E>().route(
        "/by-bookkeeping/:bookkeeping_id",
        get(handlers::by_parent::<E>),
    )
}
