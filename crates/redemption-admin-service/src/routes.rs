//! 路由配置模块
//!
//! 所有端点挂在 /api/code-redemption 前缀下（前缀由 main.rs 挂载）。

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 构建码兑换相关的路由
///
/// 六个表单提交端点 + 三个页面装载数据端点
pub fn code_redemption_routes() -> Router<AppState> {
    Router::new()
        // 表单提交
        .route("/create-lot", post(handlers::lot::create_lot))
        .route("/modify-lot", post(handlers::lot::modify_lot))
        .route("/delete-lot", post(handlers::lot::delete_lot))
        .route("/view-lot", post(handlers::lot::view_lot))
        .route("/lookup-codes", post(handlers::lookup::lookup_codes))
        .route("/redeem-a-code", post(handlers::redeem::redeem_a_code))
        // 页面装载数据
        .route("/lot-names", get(handlers::menu::lot_names))
        .route("/has-lots", get(handlers::menu::has_lots))
        .route("/rewards", get(handlers::menu::rewards))
}

/// 构建完整的 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(code_redemption_routes())
}
