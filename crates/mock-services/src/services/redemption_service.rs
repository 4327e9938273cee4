//! Mock 码兑换 RPC 服务
//!
//! 在内存里实现上游的全部 `cr_*` 方法。协议细节对齐真实上游：
//! 统一 POST 到根路径，HTTP 层恒为 200，业务错误放在信封的
//! error 字段里；行数据以字符串化 JSON 塞进 result。

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{Json, Router, extract::State, routing::post};
use chrono::{NaiveDate, Utc};
use code_dict::{CODE_DICT, UNIQUE_CHARACTERS};
use rand::Rng;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::models::{MockCode, MockLot, canonicalize};
use crate::store::MemoryStore;

/// 手工码最大长度
const MAX_CODE_LENGTH: usize = 16;
/// 自动生成码的长度
const AUTO_CODE_LENGTH: usize = 8;
/// 单批自动生成码数量上限
const MAX_CODES_PER_LOT: u32 = 10_000;

// 上游错误码。前端对这些数值做分支：9996 定位到手工码输入框，
// 9997/9998 定位到出错字段，9999 跳转不可用页。
const ERR_DUPLICATE_CODE: i64 = 9996;
const ERR_INVALID_INPUT: i64 = 9997;
const ERR_STATE: i64 = 9998;
const ERR_UNAVAILABLE: i64 = 9999;

type RpcOutcome = Result<Value, (i64, String)>;

/// Mock 服务状态
pub struct RedemptionServiceState {
    pub lots: MemoryStore<MockLot>,
    available: AtomicBool,
}

impl Default for RedemptionServiceState {
    fn default() -> Self {
        Self {
            lots: MemoryStore::new(),
            available: AtomicBool::new(true),
        }
    }
}

impl RedemptionServiceState {
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// 切换可用状态，模拟上游停服（之后所有方法返回 9999）
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// 填充演示数据：一个手工码批 + 一个自动码批
    pub fn seed_demo_data(&self) {
        let manual = MockLot {
            name: "welcome-gift".into(),
            manual: true,
            reward_type: 1,
            reward_item_id: 101,
            reward_category: "Clothing".into(),
            reward_item: "Summer Shirt".into(),
            created_at: Utc::now(),
            expiration: None,
            codes: vec![MockCode::new("WELCOME-2026")],
        };
        self.lots.insert("welcome-gift", manual);

        let auto = MockLot {
            name: "launch-party".into(),
            manual: false,
            reward_type: 2,
            reward_item_id: 201,
            reward_category: "Furniture".into(),
            reward_item: "Cattlelog Couch".into(),
            created_at: Utc::now(),
            expiration: None,
            codes: generate_unique_codes(self, 5),
        };
        self.lots.insert("launch-party", auto);
    }
}

/// RPC 请求体
#[derive(Debug, Deserialize)]
struct RpcRequest {
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct AvailabilityRequest {
    available: bool,
}

/// 构建 RPC 路由
///
/// `/` 是 RPC 入口；`/availability` 是 mock 专属的停服开关。
pub fn rpc_routes() -> Router<Arc<RedemptionServiceState>> {
    Router::new()
        .route("/", post(dispatch))
        .route("/availability", post(set_availability))
}

async fn set_availability(
    State(state): State<Arc<RedemptionServiceState>>,
    Json(req): Json<AvailabilityRequest>,
) -> Json<Value> {
    tracing::info!(available = req.available, "mock availability toggled");
    state.set_available(req.available);
    Json(json!({ "available": req.available }))
}

/// RPC 总入口：按 method 分发
async fn dispatch(
    State(state): State<Arc<RedemptionServiceState>>,
    Json(req): Json<RpcRequest>,
) -> Json<Value> {
    tracing::info!(method = %req.method, "mock rpc call");

    let outcome = if !state.is_available() {
        Err((ERR_UNAVAILABLE, "Code redemption is unavailable.".to_string()))
    } else {
        match req.method.as_str() {
            "cr_create_lot" => create_lot(&state, req.params),
            "cr_modify_lot" => modify_lot(&state, req.params),
            "cr_delete_lot" => delete_lot(&state, req.params),
            "cr_view_lot_details" => view_lot_details(&state, req.params),
            "cr_lookup" => lookup(&state, req.params),
            "cr_redeem_code" => redeem_code(&state, req.params),
            "cr_get_lot_names" => Ok(json!({ "lots": state.lots.keys() })),
            "cr_check_for_current_lots" => Ok(json!({ "hasLots": !state.lots.is_empty() })),
            "cr_get_rewards" => Ok(rewards_catalog(&state)),
            other => Err((-32601, format!("Method not found: {other}"))),
        }
    };

    Json(envelope(outcome))
}

/// 包装成响应信封。业务错误也是 HTTP 200，错误细节在 error 字段里。
fn envelope(outcome: RpcOutcome) -> Value {
    let id = Uuid::new_v4().to_string();
    match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, (i64, String)> {
    serde_json::from_value(params).map_err(|e| (ERR_INVALID_INPUT, format!("Bad params: {e}")))
}

// ==================== 奖励目录 ====================

/// 按 (rewardType, rewardItemId) 找奖励的类目名和条目名
fn reward_for(reward_type: i64, item_id: i64) -> Option<(&'static str, &'static str)> {
    match (reward_type, item_id) {
        (1, 101) => Some(("Clothing", "Summer Shirt")),
        (1, 102) => Some(("Clothing", "Beach Shorts")),
        (2, 201) => Some(("Furniture", "Cattlelog Couch")),
        (2, 202) => Some(("Furniture", "Banana Lamp")),
        (3, 301) => Some(("Special", "Party Hat")),
        _ => None,
    }
}

fn rewards_catalog(state: &RedemptionServiceState) -> Value {
    json!({
        "awardChoices": [
            {
                "manualReward": false,
                "rewardName": "Clothing",
                "rewardType": 1,
                "rewards": [
                    { "itemId": 101, "description": "Summer Shirt" },
                    { "itemId": 102, "description": "Beach Shorts" }
                ]
            },
            {
                "manualReward": false,
                "rewardName": "Furniture",
                "rewardType": 2,
                "rewards": [
                    { "itemId": 201, "description": "Cattlelog Couch" },
                    { "itemId": 202, "description": "Banana Lamp" }
                ]
            },
            {
                "manualReward": true,
                "rewardName": "Special",
                "rewardType": 3,
                "rewards": [
                    { "itemId": 301, "description": "Party Hat" }
                ]
            }
        ],
        "allowAutoGenerated": true,
        "maxCodeLength": MAX_CODE_LENGTH,
        "lotNames": state.lots.keys(),
    })
}

// ==================== 方法实现 ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLotParams {
    /// true 表示手工码批（字段名沿用协议）
    manual_code: bool,
    num_codes: Option<u32>,
    lot_name: String,
    reward_type: i64,
    reward_item_id: i64,
    manual_code_str: Option<String>,
    has_expiration: Option<String>,
    expiration_month: Option<u32>,
    expiration_day: Option<u32>,
    expiration_year: Option<i32>,
}

fn create_lot(state: &RedemptionServiceState, params: Value) -> RpcOutcome {
    let p: CreateLotParams = parse_params(params)?;

    if p.lot_name.trim().is_empty() {
        return Err((ERR_INVALID_INPUT, "Lot name is required.".to_string()));
    }
    if state.lots.contains_key(&p.lot_name) {
        return Err((ERR_INVALID_INPUT, "Lot name is already in use!".to_string()));
    }

    let Some((category, item)) = reward_for(p.reward_type, p.reward_item_id) else {
        return Err((ERR_INVALID_INPUT, "Unknown reward.".to_string()));
    };

    let expiration = match p.has_expiration.as_deref() {
        Some("Yes") => {
            let (Some(year), Some(month), Some(day)) =
                (p.expiration_year, p.expiration_month, p.expiration_day)
            else {
                return Err((ERR_INVALID_INPUT, "Expiration date is incomplete.".to_string()));
            };
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or((ERR_INVALID_INPUT, "Expiration date is invalid.".to_string()))?;
            Some(date)
        }
        _ => None,
    };

    let (codes, extra_message) = if p.manual_code {
        let raw = p.manual_code_str.unwrap_or_default();
        let canonical = canonicalize(&raw);
        if canonical.is_empty() {
            return Err((ERR_INVALID_INPUT, "Manual code is required.".to_string()));
        }
        if raw.chars().count() > MAX_CODE_LENGTH {
            return Err((ERR_INVALID_INPUT, "Code is too long.".to_string()));
        }
        if !CODE_DICT.is_legal_non_unique_code(&raw) {
            return Err((
                ERR_INVALID_INPUT,
                "Code can only contain alphanumeric characters and dashes".to_string(),
            ));
        }
        if code_exists(state, &canonical) {
            return Err((ERR_DUPLICATE_CODE, "Code already exists!".to_string()));
        }
        let extra = format!("Lot uses manual code {raw}.");
        (vec![MockCode::new(raw)], extra)
    } else {
        let count = p.num_codes.unwrap_or(0);
        if count == 0 || count > MAX_CODES_PER_LOT {
            return Err((
                ERR_INVALID_INPUT,
                format!("Number of codes must be between 1 and {MAX_CODES_PER_LOT}."),
            ));
        }
        let codes = generate_unique_codes(state, count);
        let extra = format!("Generated {count} unique codes.");
        (codes, extra)
    };

    let lot = MockLot {
        name: p.lot_name.clone(),
        manual: p.manual_code,
        reward_type: p.reward_type,
        reward_item_id: p.reward_item_id,
        reward_category: category.to_string(),
        reward_item: item.to_string(),
        created_at: Utc::now(),
        expiration,
        codes,
    };

    let rows: Vec<Value> = lot.codes.iter().map(|c| lot.detail_row(c, false)).collect();
    state.lots.insert(&p.lot_name, lot);

    Ok(json!({
        "message": format!("Successfully created lot {}.", p.lot_name),
        "extraMessage": extra_message,
        "codeLotDetails": json!(rows).to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModifyLotParams {
    lot_name: String,
    expiration_month: Option<u32>,
    expiration_day: Option<u32>,
    expiration_year: Option<i32>,
}

fn modify_lot(state: &RedemptionServiceState, params: Value) -> RpcOutcome {
    let p: ModifyLotParams = parse_params(params)?;

    let (Some(year), Some(month), Some(day)) =
        (p.expiration_year, p.expiration_month, p.expiration_day)
    else {
        return Err((ERR_INVALID_INPUT, "Expiration date is incomplete.".to_string()));
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or((ERR_INVALID_INPUT, "Expiration date is invalid.".to_string()))?;

    if !state.lots.update(&p.lot_name, |lot| lot.expiration = Some(date)) {
        return Err((ERR_STATE, "Lot does not exist.".to_string()));
    }

    // update 刚刚命中，这里必然取得到
    let rows = match state.lots.get(&p.lot_name) {
        Some(lot) => {
            let rows: Vec<Value> = lot.codes.iter().map(|c| lot.detail_row(c, false)).collect();
            json!(rows).to_string()
        }
        None => "[]".to_string(),
    };

    Ok(json!({
        "message": format!("Successfully modified lot {}.", p.lot_name),
        "extraMessage": format!("New expiration date is {date}."),
        "codeLotDetails": rows,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteLotParams {
    lot_name: String,
}

fn delete_lot(state: &RedemptionServiceState, params: Value) -> RpcOutcome {
    let p: DeleteLotParams = parse_params(params)?;

    match state.lots.remove(&p.lot_name) {
        Some(lot) => Ok(json!({
            "message": format!("Successfully deleted lot {}.", p.lot_name),
            "extraMessage": format!("Removed {} codes.", lot.codes.len()),
        })),
        None => Err((ERR_STATE, "Lot does not exist.".to_string())),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewLotParams {
    lot_name: String,
    #[serde(default)]
    just_code: bool,
    filter_option: Option<String>,
}

fn view_lot_details(state: &RedemptionServiceState, params: Value) -> RpcOutcome {
    let p: ViewLotParams = parse_params(params)?;

    let Some(lot) = state.lots.get(&p.lot_name) else {
        return Err((ERR_STATE, "Lot does not exist.".to_string()));
    };

    let today = Utc::now().date_naive();
    let filter = p.filter_option.as_deref().unwrap_or("All Codes");

    let mut rows = Vec::new();
    for code in &lot.codes {
        let keep = match filter {
            "All Codes" => true,
            "Redeemable Codes" => lot.is_redeemable(code, today),
            "Non-Redeemable Codes" => !lot.is_redeemable(code, today),
            "Redeemed Codes" => !code.redeemed_by.is_empty(),
            "Expired Codes" => lot.is_expired_at(today),
            other => {
                return Err((ERR_INVALID_INPUT, format!("Unknown filter option: {other}")));
            }
        };
        if keep {
            rows.push(lot.detail_row(code, p.just_code));
        }
    }

    Ok(json!({
        "message": format!("Found {} codes.", rows.len()),
        "lookupResults": json!(rows).to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupParams {
    code: Option<String>,
    av_id: Option<u64>,
}

fn lookup(state: &RedemptionServiceState, params: Value) -> RpcOutcome {
    let p: LookupParams = parse_params(params)?;

    let mut rows = Vec::new();

    if let Some(code) = p.code.as_deref().filter(|c| !c.is_empty()) {
        let canonical = canonicalize(code);
        for lot in state.lots.list() {
            for c in lot.codes.iter().filter(|c| c.canonical == canonical) {
                rows.push(lot.detail_row(c, false));
            }
        }
        if rows.is_empty() {
            return Err((ERR_STATE, "Code does not exist.".to_string()));
        }
    } else if let Some(av_id) = p.av_id {
        for lot in state.lots.list() {
            for c in lot.codes.iter().filter(|c| c.redeemed_by.contains(&av_id)) {
                rows.push(lot.detail_row(c, false));
            }
        }
        if rows.is_empty() {
            return Err((
                ERR_STATE,
                "No codes have been redeemed by that avatar.".to_string(),
            ));
        }
    } else {
        return Err((ERR_INVALID_INPUT, "Either code or avId is required.".to_string()));
    }

    Ok(json!({
        "message": format!("Found {} codes.", rows.len()),
        "lookupResults": json!(rows).to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedeemParams {
    code: String,
    av_id: u64,
}

fn redeem_code(state: &RedemptionServiceState, params: Value) -> RpcOutcome {
    let p: RedeemParams = parse_params(params)?;

    if !CODE_DICT.is_legal_code(&p.code) {
        return Err((
            ERR_INVALID_INPUT,
            "Code can only contain alphanumeric characters and dashes".to_string(),
        ));
    }

    let canonical = canonicalize(&p.code);
    let lot_name = state
        .lots
        .list()
        .into_iter()
        .find(|lot| lot.codes.iter().any(|c| c.canonical == canonical))
        .map(|lot| lot.name);

    let Some(lot_name) = lot_name else {
        return Err((ERR_STATE, "Code does not exist.".to_string()));
    };

    // 在锁内复核状态再落兑换记录，避免并发兑换同一个 unique 码
    let mut outcome: RpcOutcome = Err((ERR_STATE, "Code does not exist.".to_string()));
    state.lots.update(&lot_name, |lot| {
        let today = Utc::now().date_naive();
        if lot.is_expired_at(today) {
            outcome = Err((ERR_STATE, "Code is expired.".to_string()));
            return;
        }
        let manual = lot.manual;
        let Some(code) = lot.codes.iter_mut().find(|c| c.canonical == canonical) else {
            return;
        };
        if code.redeemed_by.contains(&p.av_id) {
            outcome = Err((
                ERR_STATE,
                "Code has already been redeemed by this avatar.".to_string(),
            ));
            return;
        }
        if !manual && !code.redeemed_by.is_empty() {
            outcome = Err((ERR_STATE, "Code has already been redeemed.".to_string()));
            return;
        }
        code.redeemed_by.push(p.av_id);
        outcome = Ok(json!({
            "results": format!("Successfully redeemed {}!", code.display)
        }));
    });

    outcome
}

// ==================== 辅助函数 ====================

fn code_exists(state: &RedemptionServiceState, canonical: &str) -> bool {
    state
        .lots
        .list()
        .iter()
        .any(|lot| lot.codes.iter().any(|c| c.canonical == canonical))
}

/// 从受限字符表生成不重复的自动码
fn generate_unique_codes(state: &RedemptionServiceState, count: u32) -> Vec<MockCode> {
    let alphabet: Vec<char> = UNIQUE_CHARACTERS.chars().collect();
    let mut rng = rand::rng();

    let mut taken: HashSet<String> = state
        .lots
        .list()
        .iter()
        .flat_map(|lot| lot.codes.iter().map(|c| c.canonical.clone()))
        .collect();

    let mut codes = Vec::with_capacity(count as usize);
    while codes.len() < count as usize {
        let candidate: String = (0..AUTO_CODE_LENGTH)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())])
            .collect();
        if taken.insert(candidate.clone()) {
            codes.push(MockCode::new(candidate));
        }
    }
    codes
}
