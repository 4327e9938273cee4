//! 应用状态定义
//!
//! Axum 路由共享的应用状态。

use crate::rpc::UberdogClient;

/// Axum 应用共享状态
///
/// 控制台自身无状态，只持有上游 RPC 客户端；
/// 客户端内部的连接池随 Clone 共享。
#[derive(Clone)]
pub struct AppState {
    /// 上游游戏后端的 RPC 客户端
    pub rpc: UberdogClient,
}

impl AppState {
    pub fn new(rpc: UberdogClient) -> Self {
        Self { rpc }
    }
}
