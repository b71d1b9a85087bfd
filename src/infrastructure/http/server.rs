//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置
//!
//! 全局中间件（由外到内）：CORS → 安全响应头 → Trace → 请求日志 → panic 恢复 → 超时 → 限流

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Router};
use http::header::{
    CONTENT_LENGTH, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
    X_XSS_PROTECTION,
};
use http::{HeaderName, HeaderValue, Method};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ApiError;
use super::middleware::{rate_limit_middleware, request_logging_middleware};
use super::routes::create_routes;
use super::state::AppState;
use crate::config::CorsConfig;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// HTTP 服务器
pub struct HttpServer {
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// 启动服务器（带优雅关闭）
    ///
    /// 收到关闭信号后停止接受新连接，最多等待 `shutdown_timeout_secs` 让进行中的请求完成
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let server_config = self.state.config.server.clone();
        let router = build_router(self.state.clone());
        let addr = server_config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        let sweeper = self.state.rate_limiter.spawn_sweeper();

        let signalled = Arc::new(Notify::new());
        let notify = signalled.clone();
        let serve = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal.await;
            info!("Shutdown signal received, draining in-flight requests");
            notify.notify_one();
        })
        .into_future();

        let drain_deadline = async {
            signalled.notified().await;
            tokio::time::sleep(server_config.shutdown_timeout()).await;
        };

        let result = tokio::select! {
            result = serve => result,
            _ = drain_deadline => {
                tracing::warn!(
                    timeout_secs = server_config.shutdown_timeout_secs,
                    "Graceful shutdown timed out, dropping remaining connections"
                );
                Ok(())
            }
        };

        sweeper.abort();
        info!("HTTP server stopped");
        result
    }
}

/// 构建带全局中间件的 Router
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);
    let timeout = state.config.server.request_timeout();

    create_routes(state.clone())
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(timeout_response))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(cors)
}

/// CORS 配置；仅在来源为显式列表时允许携带凭据
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.trim().as_bytes()).ok())
        .collect();
    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|h| h.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers([CONTENT_LENGTH])
        .max_age(CORS_MAX_AGE);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();
    cors.allow_origin(origins).allow_credentials(true)
}

/// 超时转换为 408 响应信封
async fn timeout_response(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::RequestTimeout("Request timeout".to_string())
    } else {
        ApiError::Internal {
            message: "Internal server error".to_string(),
            errors: Some(serde_json::Value::String(err.to_string())),
        }
    }
}

/// panic 转换为 500 响应信封
fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");

    ApiError::internal("Internal server error").into_response()
}
