//! 码批管理处理器
//!
//! 创建、修改、删除、查看码批。处理器只做表单校验和参数整形，
//! 实际存储全在上游，这里一律转发。

use axum::{Json, extract::State};
use chrono::{DateTime, Datelike, NaiveDate};
use code_dict::CODE_DICT;
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        request::{CodeType, CreateLotForm, DeleteLotForm, HasExpiration, ModifyLotForm, ViewLotForm},
        response::{LookupResponse, LotMutationResponse},
    },
    error::ConsoleError,
    rpc::{CreateLotParams, ModifyLotParams, ViewLotParams},
    state::AppState,
};

/// 把表单里的日期拆成上游需要的月/日/年三个参数（月份从 1 起）。
///
/// 日期选择器提交的是 `YYYY-MM-DD`，个别旧客户端会发完整的
/// RFC 3339 时间戳，两种都接受。
fn split_expiration(raw: &str) -> Result<(u32, u32, i32), ConsoleError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ConsoleError::Validation("Expiration Date is invalid".into()))?;

    Ok((date.month(), date.day(), date.year()))
}

/// 创建码批
///
/// POST /api/code-redemption/create-lot
pub async fn create_lot(
    State(state): State<AppState>,
    Json(form): Json<CreateLotForm>,
) -> Result<Json<LotMutationResponse>, ConsoleError> {
    form.validate()?;

    // 自动化测试占用的批名前缀，不允许手工使用
    if form.lot_name.contains("temp_auto_test_lot_") {
        return Err(ConsoleError::Validation("Lot name is already in use!".into()));
    }

    if form.number_of_codes != form.confirm_number_of_codes {
        return Err(ConsoleError::Validation("Number of codes must match!".into()));
    }
    if form.manual_code != form.confirm_manual_code {
        return Err(ConsoleError::Validation("Manual Codes must match!".into()));
    }

    let (num_codes, manual_code_str) = match form.code_type {
        CodeType::Auto => {
            let count = form.number_of_codes.filter(|n| *n > 0).ok_or_else(|| {
                ConsoleError::Validation("Number of Codes is required".into())
            })?;
            // Auto 码批不携带手工码字段
            (Some(count), None)
        }
        CodeType::Manual => {
            let code = form.manual_code.clone().unwrap_or_default();
            if code.is_empty() {
                return Err(ConsoleError::Validation("Manual Code is required".into()));
            }
            for c in code.chars() {
                if !CODE_DICT.is_valid_manual_char(c.to_ascii_uppercase()) {
                    return Err(ConsoleError::Validation(
                        "Code can only contain alphanumeric characters and dashes".into(),
                    ));
                }
            }
            // 手工码批固定一个码
            (Some(1), Some(code))
        }
    };

    let (expiration_month, expiration_day, expiration_year) =
        match (form.has_expiration, form.expiration.as_deref()) {
            (HasExpiration::Yes, Some(raw)) if !raw.is_empty() => {
                let (month, day, year) = split_expiration(raw)?;
                (Some(month), Some(day), Some(year))
            }
            (HasExpiration::Yes, _) => {
                return Err(ConsoleError::Validation("Expiration Date is required".into()));
            }
            (HasExpiration::No, _) => (None, None, None),
        };

    let result = state
        .rpc
        .create_lot(CreateLotParams {
            manual_code: form.code_type == CodeType::Manual,
            num_codes,
            lot_name: form.lot_name.clone(),
            reward_type: form.reward_type,
            reward_item_id: form.reward_item_id,
            manual_code_str,
            has_expiration: form.has_expiration,
            expiration_month,
            expiration_day,
            expiration_year,
        })
        .await?;

    info!(lot_name = %form.lot_name, code_type = ?form.code_type, "lot created");

    Ok(Json(LotMutationResponse {
        success: true,
        message: result.message,
        extra_message: result.extra_message,
        code_lot_details: result.code_lot_details,
    }))
}

/// 修改码批（目前只支持改过期日期）
///
/// POST /api/code-redemption/modify-lot
pub async fn modify_lot(
    State(state): State<AppState>,
    Json(form): Json<ModifyLotForm>,
) -> Result<Json<LotMutationResponse>, ConsoleError> {
    form.validate()?;

    let raw = form
        .expiration
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConsoleError::Validation("Expiration Date is required".into()))?;
    let (month, day, year) = split_expiration(raw)?;

    let result = state
        .rpc
        .modify_lot(ModifyLotParams {
            lot_name: form.lot_name.clone(),
            expiration_month: Some(month),
            expiration_day: Some(day),
            expiration_year: Some(year),
        })
        .await?;

    info!(lot_name = %form.lot_name, "lot expiration changed");

    Ok(Json(LotMutationResponse {
        success: true,
        message: result.message,
        extra_message: result.extra_message,
        code_lot_details: result.code_lot_details,
    }))
}

/// 删除码批
///
/// POST /api/code-redemption/delete-lot
pub async fn delete_lot(
    State(state): State<AppState>,
    Json(form): Json<DeleteLotForm>,
) -> Result<Json<LotMutationResponse>, ConsoleError> {
    form.validate()?;

    if form.lot_name != form.confirm_lot_name {
        return Err(ConsoleError::Validation("Lot names must match!".into()));
    }

    let result = state.rpc.delete_lot(&form.lot_name).await?;

    info!(lot_name = %form.lot_name, "lot deleted");

    Ok(Json(LotMutationResponse {
        success: true,
        message: result.message,
        extra_message: result.extra_message,
        code_lot_details: None,
    }))
}

/// 查看码批明细
///
/// POST /api/code-redemption/view-lot
pub async fn view_lot(
    State(state): State<AppState>,
    Json(form): Json<ViewLotForm>,
) -> Result<Json<LookupResponse>, ConsoleError> {
    form.validate()?;

    let result = state
        .rpc
        .view_lot_details(ViewLotParams {
            lot_name: form.lot_name,
            just_code: form.just_code,
            filter_option: form.filter_option,
        })
        .await?;

    Ok(Json(LookupResponse {
        success: true,
        message: result.message,
        lookup_results: result.lookup_results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_expiration_plain_date() {
        assert_eq!(split_expiration("2026-08-31").unwrap(), (8, 31, 2026));
        // 月份从 1 起
        assert_eq!(split_expiration("2027-01-02").unwrap(), (1, 2, 2027));
    }

    #[test]
    fn test_split_expiration_rfc3339() {
        assert_eq!(
            split_expiration("2026-12-25T00:00:00Z").unwrap(),
            (12, 25, 2026)
        );
    }

    #[test]
    fn test_split_expiration_rejects_garbage() {
        for raw in ["", "next tuesday", "31/08/2026"] {
            let err = split_expiration(raw).unwrap_err();
            assert!(matches!(err, ConsoleError::Validation(_)), "raw={raw}");
        }
    }
}
