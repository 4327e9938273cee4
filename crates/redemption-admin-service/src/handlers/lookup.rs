//! 码查询处理器

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    dto::{
        request::{LookupForm, LookupMode},
        response::LookupResponse,
    },
    error::ConsoleError,
    state::AppState,
};

/// 按码或按兑换人 AvId 查询码记录
///
/// POST /api/code-redemption/lookup-codes
///
/// mode 决定哪个参数必填；另一个即便提交了也不转发，
/// 避免上游在两个条件间犹豫。
pub async fn lookup_codes(
    State(state): State<AppState>,
    Json(form): Json<LookupForm>,
) -> Result<Json<LookupResponse>, ConsoleError> {
    form.validate()?;

    let (code, av_id) = match form.mode {
        LookupMode::Code => {
            let code = form
                .code
                .as_deref()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ConsoleError::Validation("Code is required".into()))?;
            (Some(code), None)
        }
        LookupMode::AvId => {
            let av_id = form
                .av_id
                .ok_or_else(|| ConsoleError::Validation("AvId is required".into()))?;
            (None, Some(av_id))
        }
    };

    let result = state.rpc.lookup(code, av_id).await?;

    Ok(Json(LookupResponse {
        success: true,
        message: result.message,
        lookup_results: result.lookup_results,
    }))
}
