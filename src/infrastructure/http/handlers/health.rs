//! Health Handler
//!
//! 探测所有租户连接池，不需要租户头与认证

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, HealthData, TenantStatus};
use crate::infrastructure::http::state::AppState;

pub const SERVICE_NAME: &str = "pos-mojosoft-so-service";

/// GET /health
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let results = state.registry.ping_all().await;
    let healthy = results.iter().all(|tenant| tenant.healthy);

    let tenants = results
        .into_iter()
        .map(|tenant| TenantStatus {
            code: tenant.code,
            status: if tenant.healthy { "healthy" } else { "unhealthy" },
        })
        .collect();

    if healthy {
        let data = HealthData {
            status: "healthy",
            service: SERVICE_NAME,
            tenants,
        };
        return (
            StatusCode::OK,
            Json(ApiResponse::success("Service is healthy", data)),
        );
    }

    tracing::error!("Health check failed: tenant database unreachable");

    let body = ApiResponse {
        success: false,
        message: "Database ping failed".to_string(),
        data: Some(HealthData {
            status: "unhealthy",
            service: SERVICE_NAME,
            tenants,
        }),
        errors: None,
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body))
}
