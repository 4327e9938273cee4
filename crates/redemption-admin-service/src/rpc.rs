//! 上游 RPC 客户端
//!
//! 游戏后端只有一个入口：向端点 POST `{"method": ..., "params": ...}`，
//! 返回 `{"jsonrpc", "id", "result"}` 或带 `error: {code, message}` 的信封。
//! 上游把行数据打包成 result 里的字符串化 JSON（codeLotDetails /
//! lookupResults），由这里解析成类型化的行。

use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::dto::request::{FilterOption, HasExpiration};
use crate::dto::response::{AwardChoice, CodeLotDetails};
use crate::error::ConsoleError;
use redemption_shared::config::UpstreamConfig;

/// 上游返回的错误对象
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// 上游响应信封
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// 创建码批的 RPC 参数
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotParams {
    /// true 表示手工码批（字段名沿用上游协议，虽然它其实是个布尔）
    pub manual_code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_codes: Option<u32>,
    pub lot_name: String,
    pub reward_type: i64,
    pub reward_item_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_code_str: Option<String>,
    pub has_expiration: HasExpiration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_year: Option<i32>,
}

/// 修改码批的 RPC 参数
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyLotParams {
    pub lot_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_year: Option<i32>,
}

/// 查看码批的 RPC 参数
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewLotParams {
    pub lot_name: String,
    pub just_code: bool,
    pub filter_option: FilterOption,
}

/// 创建/修改/删除返回的载荷（行数据已解析）
#[derive(Debug)]
pub struct LotMutation {
    pub message: Option<String>,
    pub extra_message: Option<String>,
    pub code_lot_details: Option<Vec<CodeLotDetails>>,
}

/// 查看/查询返回的载荷（行数据已解析）
#[derive(Debug)]
pub struct LookupResults {
    pub message: Option<String>,
    pub lookup_results: Vec<CodeLotDetails>,
}

/// 奖励目录载荷
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCatalog {
    pub award_choices: Vec<AwardChoice>,
    pub allow_auto_generated: bool,
    pub max_code_length: u32,
    pub lot_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLotMutation {
    message: Option<String>,
    extra_message: Option<String>,
    /// 字符串化 JSON
    code_lot_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLookup {
    message: Option<String>,
    /// 字符串化 JSON
    lookup_results: Option<String>,
}

/// 上游 RPC 客户端
///
/// 无状态，可随 AppState 克隆共享。
#[derive(Debug, Clone)]
pub struct UberdogClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UberdogClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConsoleError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| ConsoleError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// 发起一次 RPC 调用并拆开信封。
    ///
    /// 信封里带 error、或者既无 error 也无 result 时，都按上游
    /// 业务错误处理；传输失败和解析失败是另两类错误，不混用。
    async fn call(&self, method: &str, params: Value) -> Result<Value, ConsoleError> {
        tracing::debug!(method, "calling upstream rpc");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "method": method, "params": params }))
            .send()
            .await
            .map_err(|e| ConsoleError::UpstreamUnreachable(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::UpstreamUnreachable(format!(
                "{method}: upstream returned HTTP {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ConsoleError::UpstreamUnreachable(format!("{method}: {e}")))?;

        let envelope: RpcEnvelope = serde_json::from_slice(&body)
            .map_err(|e| ConsoleError::MalformedUpstreamResponse(format!("{method}: {e}")))?;

        if let Some(error) = envelope.error {
            tracing::warn!(method, code = ?error.code, "upstream reported error");
            return Err(ConsoleError::Upstream {
                code: error.code,
                message: error.message,
            });
        }

        envelope.result.ok_or(ConsoleError::Upstream {
            code: None,
            message: None,
        })
    }

    fn parse_result<T: DeserializeOwned>(method: &str, result: Value) -> Result<T, ConsoleError> {
        serde_json::from_value(result)
            .map_err(|e| ConsoleError::MalformedUpstreamResponse(format!("{method}: {e}")))
    }

    /// 解析 result 里字符串化的行数据
    fn parse_details(method: &str, raw: &str) -> Result<Vec<CodeLotDetails>, ConsoleError> {
        serde_json::from_str(raw).map_err(|e| {
            ConsoleError::MalformedUpstreamResponse(format!("{method}: bad detail rows: {e}"))
        })
    }

    pub async fn create_lot(&self, params: CreateLotParams) -> Result<LotMutation, ConsoleError> {
        const METHOD: &str = "cr_create_lot";
        let result = self.call(METHOD, json!(params)).await?;
        let raw: RawLotMutation = Self::parse_result(METHOD, result)?;
        let code_lot_details = raw
            .code_lot_details
            .map(|s| Self::parse_details(METHOD, &s))
            .transpose()?;
        Ok(LotMutation {
            message: raw.message,
            extra_message: raw.extra_message,
            code_lot_details,
        })
    }

    pub async fn modify_lot(&self, params: ModifyLotParams) -> Result<LotMutation, ConsoleError> {
        const METHOD: &str = "cr_modify_lot";
        let result = self.call(METHOD, json!(params)).await?;
        let raw: RawLotMutation = Self::parse_result(METHOD, result)?;
        let code_lot_details = raw
            .code_lot_details
            .map(|s| Self::parse_details(METHOD, &s))
            .transpose()?;
        Ok(LotMutation {
            message: raw.message,
            extra_message: raw.extra_message,
            code_lot_details,
        })
    }

    pub async fn delete_lot(&self, lot_name: &str) -> Result<LotMutation, ConsoleError> {
        const METHOD: &str = "cr_delete_lot";
        let result = self.call(METHOD, json!({ "lotName": lot_name })).await?;
        let raw: RawLotMutation = Self::parse_result(METHOD, result)?;
        Ok(LotMutation {
            message: raw.message,
            extra_message: raw.extra_message,
            code_lot_details: None,
        })
    }

    pub async fn view_lot_details(
        &self,
        params: ViewLotParams,
    ) -> Result<LookupResults, ConsoleError> {
        const METHOD: &str = "cr_view_lot_details";
        let result = self.call(METHOD, json!(params)).await?;
        let raw: RawLookup = Self::parse_result(METHOD, result)?;
        let lookup_results = match raw.lookup_results {
            Some(s) => Self::parse_details(METHOD, &s)?,
            None => Vec::new(),
        };
        Ok(LookupResults {
            message: raw.message,
            lookup_results,
        })
    }

    pub async fn lookup(
        &self,
        code: Option<&str>,
        av_id: Option<u64>,
    ) -> Result<LookupResults, ConsoleError> {
        const METHOD: &str = "cr_lookup";
        let result = self
            .call(METHOD, json!({ "code": code, "avId": av_id }))
            .await?;
        let raw: RawLookup = Self::parse_result(METHOD, result)?;
        let lookup_results = match raw.lookup_results {
            Some(s) => Self::parse_details(METHOD, &s)?,
            None => Vec::new(),
        };
        Ok(LookupResults {
            message: raw.message,
            lookup_results,
        })
    }

    /// 兑换一个码。成功消息在上游 result 的 `results` 字段里。
    pub async fn redeem_code(&self, code: &str, av_id: u64) -> Result<Option<String>, ConsoleError> {
        const METHOD: &str = "cr_redeem_code";
        let result = self
            .call(METHOD, json!({ "code": code, "avId": av_id }))
            .await?;

        #[derive(Deserialize)]
        struct RedeemResult {
            results: Option<String>,
        }
        let raw: RedeemResult = Self::parse_result(METHOD, result)?;
        Ok(raw.results)
    }

    pub async fn get_lot_names(&self) -> Result<Vec<String>, ConsoleError> {
        const METHOD: &str = "cr_get_lot_names";
        let result = self.call(METHOD, json!({})).await?;

        #[derive(Deserialize)]
        struct LotNames {
            lots: Option<Vec<String>>,
        }
        let raw: LotNames = Self::parse_result(METHOD, result)?;
        raw.lots.ok_or_else(|| {
            ConsoleError::MalformedUpstreamResponse(format!("{METHOD}: missing lots"))
        })
    }

    /// 上游没回 hasLots 字段时按 false 处理，不算错误。
    pub async fn check_for_current_lots(&self) -> Result<bool, ConsoleError> {
        const METHOD: &str = "cr_check_for_current_lots";
        let result = self.call(METHOD, json!({})).await?;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct HasLots {
            has_lots: Option<bool>,
        }
        let raw: HasLots = Self::parse_result(METHOD, result)?;
        Ok(raw.has_lots.unwrap_or(false))
    }

    /// 拉取奖励目录。四个字段缺一不可，缺了按坏载荷处理。
    pub async fn get_rewards(&self) -> Result<RewardCatalog, ConsoleError> {
        const METHOD: &str = "cr_get_rewards";
        let result = self.call(METHOD, json!({})).await?;
        Self::parse_result(METHOD, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_error() {
        let envelope: RpcEnvelope = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "error": {"code": 9997, "message": "Lot name is already in use!"}
        }))
        .unwrap();

        let error = envelope.error.unwrap();
        assert_eq!(error.code, Some(9997));
        assert_eq!(error.message.as_deref(), Some("Lot name is already in use!"));
        assert!(envelope.result.is_none());
    }

    #[test]
    fn test_envelope_with_result_only() {
        let envelope: RpcEnvelope = serde_json::from_value(serde_json::json!({
            "result": {"hasLots": true}
        }))
        .unwrap();
        assert!(envelope.error.is_none());
        assert_eq!(envelope.result.unwrap()["hasLots"], serde_json::json!(true));
    }

    /// 参数的字段名是上游协议的一部分，逐个锁定
    #[test]
    fn test_create_lot_params_wire_keys() {
        let params = CreateLotParams {
            manual_code: true,
            num_codes: None,
            lot_name: "summer-event".into(),
            reward_type: 1,
            reward_item_id: 101,
            manual_code_str: Some("SUMMER-2026".into()),
            has_expiration: HasExpiration::Yes,
            expiration_month: Some(8),
            expiration_day: Some(31),
            expiration_year: Some(2026),
        };
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["manualCode"], serde_json::json!(true));
        assert_eq!(value["lotName"], serde_json::json!("summer-event"));
        assert_eq!(value["manualCodeStr"], serde_json::json!("SUMMER-2026"));
        assert_eq!(value["hasExpiration"], serde_json::json!("Yes"));
        assert_eq!(value["expirationMonth"], serde_json::json!(8));
        // Auto 专用字段缺席时不应出现
        assert!(value.get("numCodes").is_none());
    }

    #[test]
    fn test_view_lot_params_wire_keys() {
        let params = ViewLotParams {
            lot_name: "summer-event".into(),
            just_code: true,
            filter_option: FilterOption::ExpiredCodes,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["justCode"], serde_json::json!(true));
        assert_eq!(value["filterOption"], serde_json::json!("Expired Codes"));
    }

    /// 行数据以字符串化 JSON 到达，解析后字段对得上
    #[test]
    fn test_stringified_detail_rows_parse() {
        let raw = r#"[{"code":"CDFG","manual":"no","redemptions":"0"}]"#;
        let rows = UberdogClient::parse_details("cr_view_lot_details", raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code.as_deref(), Some("CDFG"));
        assert_eq!(rows[0].redemptions.as_deref(), Some("0"));
    }

    #[test]
    fn test_bad_detail_rows_are_malformed_response() {
        let err = UberdogClient::parse_details("cr_lookup", "not json").unwrap_err();
        assert!(matches!(err, ConsoleError::MalformedUpstreamResponse(_)));
    }
}
