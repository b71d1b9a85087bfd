//! so-service - POS 销售单服务
//!
//! 启动流程：加载配置 → 初始化日志 → 连接所有租户库并迁移 → 启动 HTTP 服务器
//! → 收到关闭信号后等待请求完成并关闭所有租户连接池

use std::sync::Arc;

use so_service::config::{load_config, print_config};
use so_service::infrastructure::http::{AppState, HttpServer};
use so_service::infrastructure::tenancy::TenantRegistry;
use so_service::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log)?;

    tracing::info!("so-service - POS 销售单服务");
    print_config(&config);

    // 每个租户一个数据库，启动时执行迁移
    let registry = Arc::new(
        TenantRegistry::connect_all(&config.database, &config.tenancy.codes).await?,
    );

    let state = Arc::new(AppState::new(config, registry.clone()));
    let server = HttpServer::new(state);

    // 启动服务器（带优雅关闭）
    let result = server.run_with_shutdown(shutdown_signal()).await;

    registry.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// SIGINT / SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal");
}
