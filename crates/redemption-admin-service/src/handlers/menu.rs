//! 页面装载数据处理器
//!
//! 主菜单和各表单页在渲染前拉取的数据：批名列表、是否有码批、
//! 奖励目录。

use axum::{Json, extract::State};

use crate::{
    dto::response::{HasLotsResponse, LotNamesResponse, RewardsResponse},
    error::ConsoleError,
    state::AppState,
};

/// 现有码批名列表
///
/// GET /api/code-redemption/lot-names
pub async fn lot_names(
    State(state): State<AppState>,
) -> Result<Json<LotNamesResponse>, ConsoleError> {
    let lots = state.rpc.get_lot_names().await?;
    Ok(Json(LotNamesResponse { lots }))
}

/// 是否存在任何码批
///
/// GET /api/code-redemption/has-lots
///
/// 上游报业务错误时主菜单按"没有码批"降级渲染，不算失败；
/// 连不上上游仍然是错误。
pub async fn has_lots(State(state): State<AppState>) -> Result<Json<HasLotsResponse>, ConsoleError> {
    let has_lots = match state.rpc.check_for_current_lots().await {
        Ok(value) => value,
        Err(ConsoleError::Upstream { .. }) => false,
        Err(e) => return Err(e),
    };

    Ok(Json(HasLotsResponse { has_lots }))
}

/// 创建表单的奖励目录
///
/// GET /api/code-redemption/rewards
pub async fn rewards(State(state): State<AppState>) -> Result<Json<RewardsResponse>, ConsoleError> {
    let catalog = state.rpc.get_rewards().await?;

    Ok(Json(RewardsResponse {
        award_choices: catalog.award_choices,
        allow_auto_generated: catalog.allow_auto_generated,
        max_code_length: catalog.max_code_length,
        lot_names: catalog.lot_names,
    }))
}
