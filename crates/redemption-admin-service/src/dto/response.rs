//! 响应 DTO 定义
//!
//! 成功响应统一带 `success: true`；可选字段缺席时不出现在 JSON 里。

use serde::{Deserialize, Serialize};

/// 单行码记录
///
/// 所有字段都可选：上游按查询的 justCode/过滤选项裁剪列，
/// 前端表格只渲染出现了的列。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLotDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_av_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemptions: Option<String>,
}

/// 创建/修改/删除码批的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotMutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_lot_details: Option<Vec<CodeLotDetails>>,
}

/// 查看码批/查询码的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub lookup_results: Vec<CodeLotDetails>,
}

/// 兑换响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 批名列表响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotNamesResponse {
    pub lots: Vec<String>,
}

/// 是否存在码批的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HasLotsResponse {
    pub has_lots: bool,
}

/// 单个奖励项
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub item_id: i64,
    pub description: String,
}

/// 奖励类目：同一类目下有若干可选奖励项
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardChoice {
    /// 该类目是否只对手工码批开放
    pub manual_reward: bool,
    pub reward_name: String,
    pub reward_type: i64,
    pub rewards: Vec<Reward>,
}

/// 创建表单所需的奖励目录响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsResponse {
    pub award_choices: Vec<AwardChoice>,
    pub allow_auto_generated: bool,
    pub max_code_length: u32,
    pub lot_names: Vec<String>,
}
