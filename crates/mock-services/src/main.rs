//! Mock 上游服务入口
//!
//! 本地起一个内存版的码兑换 RPC 服务，管理后台把
//! UBERDOG_RFC_ENDPOINT 指到这里即可联调。

use std::sync::Arc;

use clap::Parser;
use mock_services::{RedemptionServiceState, rpc_routes};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "mock-server", about = "内存版码兑换上游 RPC 服务")]
struct Cli {
    /// 监听端口
    #[arg(long, default_value_t = 8200)]
    port: u16,

    /// 日志级别（RUST_LOG 环境变量优先）
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 启动时填充演示数据
    #[arg(long)]
    populate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .init();

    let state = Arc::new(RedemptionServiceState::default());
    if cli.populate {
        state.seed_demo_data();
        tracing::info!("Demo data populated");
    }

    let app = rpc_routes().with_state(state);

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Mock uberdog RPC listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
