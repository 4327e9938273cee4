//! 码兑换管理控制台（运营端）
//!
//! 提供码批管理和码兑换的 REST API，所有操作转发到上游游戏后端。

use axum::{Json, Router, http::HeaderValue, routing::get};
use redemption_admin_service::{routes, rpc::UberdogClient, state::AppState};
use redemption_shared::{config::AppConfig, observability};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/{service_name}.toml + 环境变量覆盖
    let config = AppConfig::load("redemption-admin-service").unwrap_or_default();

    observability::init(&config.observability)?;

    info!(
        "Starting redemption-admin-service on {}",
        config.server_addr()
    );
    info!("Upstream RPC endpoint: {}", config.upstream.endpoint);

    let rpc = UberdogClient::new(&config.upstream)
        .map_err(|e| anyhow::anyhow!("failed to build upstream client: {e}"))?;
    let state = AppState::new(rpc);

    // CORS 配置：通过 REDEMPTION_CORS_ORIGINS 环境变量控制允许的来源
    // 默认允许本地开发地址，生产环境应设置为实际域名
    let allowed_origins = std::env::var("REDEMPTION_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("REDEMPTION_CORS_ORIGINS=\"*\" 在生产环境不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .nest("/api/code-redemption", routes::api_routes())
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接，
    // 等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "redemption-admin-service"
    }))
}
