//! 兑换处理器

use axum::{Json, extract::State};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{request::RedeemCodeForm, response::RedeemResponse},
    error::ConsoleError,
    state::AppState,
};

/// 为指定角色兑换一个码
///
/// POST /api/code-redemption/redeem-a-code
pub async fn redeem_a_code(
    State(state): State<AppState>,
    Json(form): Json<RedeemCodeForm>,
) -> Result<Json<RedeemResponse>, ConsoleError> {
    form.validate()?;

    let message = state.rpc.redeem_code(&form.code, form.av_id).await?;

    info!(av_id = form.av_id, "code redeemed");

    Ok(Json(RedeemResponse {
        success: true,
        message,
    }))
}
