//! 共享库
//!
//! 管理后台和 mock 上游服务共用的配置加载与日志初始化。

pub mod config;
pub mod observability;

pub use config::{AppConfig, ObservabilityConfig, ServerConfig, UpstreamConfig};
