//! 请求 DTO 定义
//!
//! 字段名与表单提交的 JSON 一致（camelCase）。
//! 简单约束走 validator 派生；跨字段的确认项比对和按码型分支的
//! 必填检查在 handler 里做，和表单提交前的检查一一对应。

use code_dict::CODE_DICT;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 手工码允许的最大长度，与上游默认的 maxCodeLength 一致
pub const MAX_MANUAL_CODE_LENGTH: u64 = 16;

/// 码型：手工码（多人共用一个码）或自动生成码（一码一兑）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CodeType {
    Manual,
    Auto,
}

/// 是否设置过期日期，原样转发给上游
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum HasExpiration {
    Yes,
    No,
}

/// 查询方式：按码查或按兑换人 AvId 查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LookupMode {
    Code,
    AvId,
}

/// 修改类型，目前只有改过期日期一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Modification {
    #[serde(rename = "Change Expiration Date")]
    ChangeExpirationDate,
}

/// 查看码批时的过滤选项，字符串值原样转发给上游
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum FilterOption {
    #[default]
    #[serde(rename = "All Codes")]
    AllCodes,
    #[serde(rename = "Redeemable Codes")]
    RedeemableCodes,
    #[serde(rename = "Non-Redeemable Codes")]
    NonRedeemableCodes,
    #[serde(rename = "Redeemed Codes")]
    RedeemedCodes,
    #[serde(rename = "Expired Codes")]
    ExpiredCodes,
}

/// 创建码批表单
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotForm {
    #[validate(length(min = 1, message = "Code Lot is required"))]
    pub lot_name: String,

    pub code_type: CodeType,

    // Auto 码批使用
    pub number_of_codes: Option<u32>,
    pub confirm_number_of_codes: Option<u32>,

    // Manual 码批使用
    #[validate(length(max = 16, message = "Code is too long"))]
    pub manual_code: Option<String>,
    pub confirm_manual_code: Option<String>,

    pub reward_type: i64,
    pub reward_item_id: i64,

    pub has_expiration: HasExpiration,
    pub expiration: Option<String>,
}

/// 修改码批表单
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModifyLotForm {
    #[validate(length(min = 1, message = "Code Lot is required"))]
    pub lot_name: String,
    pub modification: Modification,
    pub expiration: Option<String>,
}

/// 删除码批表单，两次输入的批名必须一致（比对在 handler 里做）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLotForm {
    #[validate(length(min = 1, message = "Code Lot is required"))]
    pub lot_name: String,
    #[validate(length(min = 1, message = "Code Lot is required"))]
    pub confirm_lot_name: String,
}

/// 查看码批表单
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ViewLotForm {
    #[validate(length(min = 1, message = "Code Lot is required"))]
    pub lot_name: String,
    #[serde(default)]
    pub filter_option: FilterOption,
    #[serde(default)]
    pub just_code: bool,
}

/// 查询表单：mode 决定 code 和 avId 哪个必填，检查在 handler 里
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LookupForm {
    pub mode: LookupMode,
    #[validate(custom(function = validate_legal_code))]
    pub code: Option<String>,
    pub av_id: Option<u64>,
}

/// 兑换表单
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCodeForm {
    #[validate(
        length(min = 1, message = "Code is required"),
        custom(function = validate_legal_code)
    )]
    pub code: String,
    pub av_id: u64,
}

/// 码的合法性校验：两种码型规则下任一合法即可通过。
/// 和输入框旁边的提示文案保持一致。
fn validate_legal_code(code: &str) -> Result<(), ValidationError> {
    if CODE_DICT.is_legal_code(code) {
        Ok(())
    } else {
        Err(ValidationError::new("legal_code")
            .with_message("Code can only contain alphanumeric characters and dashes".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_create_form() -> CreateLotForm {
        CreateLotForm {
            lot_name: "summer-event".into(),
            code_type: CodeType::Manual,
            number_of_codes: None,
            confirm_number_of_codes: None,
            manual_code: Some("SUMMER-2026".into()),
            confirm_manual_code: Some("SUMMER-2026".into()),
            reward_type: 1,
            reward_item_id: 101,
            has_expiration: HasExpiration::No,
            expiration: None,
        }
    }

    #[test]
    fn test_create_form_valid() {
        assert!(base_create_form().validate().is_ok());
    }

    #[test]
    fn test_create_form_rejects_empty_lot_name() {
        let mut form = base_create_form();
        form.lot_name = String::new();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_create_form_rejects_overlong_manual_code() {
        let mut form = base_create_form();
        form.manual_code = Some("A".repeat(MAX_MANUAL_CODE_LENGTH as usize + 1));
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_delete_form_requires_both_names() {
        let form = DeleteLotForm {
            lot_name: "summer-event".into(),
            confirm_lot_name: String::new(),
        };
        assert!(form.validate().is_err());

        let form = DeleteLotForm {
            lot_name: "summer-event".into(),
            confirm_lot_name: "summer-event".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_redeem_form_rejects_illegal_code() {
        let form = RedeemCodeForm {
            code: "BAD_CODE!".into(),
            av_id: 42,
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("alphanumeric"));
    }

    #[test]
    fn test_redeem_form_accepts_either_code_kind() {
        for code in ["CDFG", "cdfg", "HELLO-WORLD", "ABC 123"] {
            let form = RedeemCodeForm {
                code: code.into(),
                av_id: 42,
            };
            assert!(form.validate().is_ok(), "{code} 应当通过校验");
        }
    }

    /// 码型和过滤选项的字符串值是前后端共同的契约
    #[test]
    fn test_enum_wire_values() {
        assert_eq!(
            serde_json::to_value(FilterOption::NonRedeemableCodes).unwrap(),
            serde_json::json!("Non-Redeemable Codes")
        );
        assert_eq!(
            serde_json::to_value(Modification::ChangeExpirationDate).unwrap(),
            serde_json::json!("Change Expiration Date")
        );
        assert_eq!(
            serde_json::to_value(HasExpiration::Yes).unwrap(),
            serde_json::json!("Yes")
        );

        let mode: LookupMode = serde_json::from_value(serde_json::json!("AvId")).unwrap();
        assert_eq!(mode, LookupMode::AvId);
    }

    #[test]
    fn test_view_form_defaults() {
        let form: ViewLotForm =
            serde_json::from_value(serde_json::json!({"lotName": "summer-event"})).unwrap();
        assert_eq!(form.filter_option, FilterOption::AllCodes);
        assert!(!form.just_code);
    }
}
