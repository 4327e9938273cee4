//! redemption_service 单元测试

use super::redemption_service::*;
use crate::models::{MockCode, MockLot};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (Arc<RedemptionServiceState>, Router) {
    let state = Arc::new(RedemptionServiceState::default());
    (state.clone(), rpc_routes().with_state(state))
}

/// 发一次 RPC 调用并解出信封。HTTP 层恒为 200。
async fn rpc(app: &Router, method: &str, params: Value) -> Value {
    let body = json!({ "method": method, "params": params }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn manual_lot_params(lot: &str, code: &str) -> Value {
    json!({
        "manualCode": true,
        "lotName": lot,
        "rewardType": 1,
        "rewardItemId": 101,
        "manualCodeStr": code,
        "hasExpiration": "No"
    })
}

fn auto_lot_params(lot: &str, count: u32) -> Value {
    json!({
        "manualCode": false,
        "numCodes": count,
        "lotName": lot,
        "rewardType": 2,
        "rewardItemId": 201,
        "hasExpiration": "No"
    })
}

/// 把 result 里字符串化的行数据解出来
fn detail_rows(result: &Value, field: &str) -> Vec<Value> {
    let raw = result[field].as_str().expect("detail field is a string");
    serde_json::from_str(raw).expect("detail field is stringified JSON")
}

#[tokio::test]
async fn test_create_manual_lot() {
    let (_state, app) = test_app();

    let envelope = rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;

    assert_eq!(envelope["jsonrpc"], json!("2.0"));
    assert!(envelope.get("error").is_none());

    let result = &envelope["result"];
    assert_eq!(
        result["message"],
        json!("Successfully created lot summer-event.")
    );

    let rows = detail_rows(result, "codeLotDetails");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["code"], json!("SUMMER-2026"));
    assert_eq!(rows[0]["manual"], json!("yes"));
    assert_eq!(rows[0]["rewardCategory"], json!("Clothing"));
}

#[tokio::test]
async fn test_create_lot_duplicate_name_is_9997() {
    let (_state, app) = test_app();

    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;
    let envelope = rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "OTHER-CODE")).await;

    assert_eq!(envelope["error"]["code"], json!(9997));
    assert_eq!(
        envelope["error"]["message"],
        json!("Lot name is already in use!")
    );
}

/// 同一个码不能出现在两个批里，填充字符和大小写不参与比对
#[tokio::test]
async fn test_create_lot_duplicate_code_is_9996() {
    let (_state, app) = test_app();

    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;
    let envelope = rpc(&app, "cr_create_lot", manual_lot_params("other-event", "summer 2026")).await;

    assert_eq!(envelope["error"]["code"], json!(9996));
    assert_eq!(envelope["error"]["message"], json!("Code already exists!"));
}

#[tokio::test]
async fn test_create_lot_illegal_manual_code_is_9997() {
    let (_state, app) = test_app();

    let envelope = rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "BAD_CODE!")).await;
    assert_eq!(envelope["error"]["code"], json!(9997));
}

#[tokio::test]
async fn test_create_auto_lot_generates_codes_from_restricted_alphabet() {
    let (_state, app) = test_app();

    let envelope = rpc(&app, "cr_create_lot", auto_lot_params("launch-party", 20)).await;
    let rows = detail_rows(&envelope["result"], "codeLotDetails");
    assert_eq!(rows.len(), 20);

    let mut seen = std::collections::HashSet::new();
    for row in &rows {
        let code = row["code"].as_str().unwrap();
        assert!(
            code.chars().all(|c| code_dict::UNIQUE_CHARACTERS.contains(c)),
            "{code} 超出了受限字符表"
        );
        assert!(seen.insert(code.to_string()), "{code} 重复生成");
        assert_eq!(row["manual"], json!("no"));
    }
}

#[tokio::test]
async fn test_redeem_manual_code_multiple_avatars() {
    let (_state, app) = test_app();
    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;

    // 手工码允许不同角色各兑一次
    let first = rpc(&app, "cr_redeem_code", json!({"code": "SUMMER-2026", "avId": 42})).await;
    assert_eq!(
        first["result"]["results"],
        json!("Successfully redeemed SUMMER-2026!")
    );

    let second = rpc(&app, "cr_redeem_code", json!({"code": "SUMMER-2026", "avId": 77})).await;
    assert!(second.get("error").is_none());

    // 同一角色不能重复兑
    let again = rpc(&app, "cr_redeem_code", json!({"code": "SUMMER-2026", "avId": 42})).await;
    assert_eq!(again["error"]["code"], json!(9998));
}

/// 比对形式统一：混合大小写、加填充字符都指向同一个码
#[tokio::test]
async fn test_redeem_accepts_canonical_variants() {
    let (_state, app) = test_app();
    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;

    let envelope = rpc(&app, "cr_redeem_code", json!({"code": "summer 2026", "avId": 42})).await;
    assert!(envelope.get("error").is_none());
}

#[tokio::test]
async fn test_redeem_unique_code_only_once() {
    let (state, app) = test_app();
    rpc(&app, "cr_create_lot", auto_lot_params("launch-party", 1)).await;

    let lot = state.lots.get("launch-party").unwrap();
    let code = lot.codes[0].display.clone();

    let first = rpc(&app, "cr_redeem_code", json!({"code": code, "avId": 42})).await;
    assert!(first.get("error").is_none());

    let second = rpc(&app, "cr_redeem_code", json!({"code": code, "avId": 77})).await;
    assert_eq!(second["error"]["code"], json!(9998));
    assert_eq!(
        second["error"]["message"],
        json!("Code has already been redeemed.")
    );
}

#[tokio::test]
async fn test_redeem_unknown_code_is_9998() {
    let (_state, app) = test_app();
    let envelope = rpc(&app, "cr_redeem_code", json!({"code": "NO-SUCH-CODE", "avId": 42})).await;
    assert_eq!(envelope["error"]["code"], json!(9998));
    assert_eq!(envelope["error"]["message"], json!("Code does not exist."));
}

#[tokio::test]
async fn test_redeem_illegal_code_is_9997() {
    let (_state, app) = test_app();
    let envelope = rpc(&app, "cr_redeem_code", json!({"code": "BAD_CODE!", "avId": 42})).await;
    assert_eq!(envelope["error"]["code"], json!(9997));
}

#[tokio::test]
async fn test_redeem_expired_code_is_9998() {
    let (state, app) = test_app();

    let expired = MockLot {
        name: "old-event".into(),
        manual: true,
        reward_type: 1,
        reward_item_id: 101,
        reward_category: "Clothing".into(),
        reward_item: "Summer Shirt".into(),
        created_at: Utc::now() - Duration::days(30),
        expiration: Some((Utc::now() - Duration::days(3)).date_naive()),
        codes: vec![MockCode::new("OLD-CODE")],
    };
    state.lots.insert("old-event", expired);

    let envelope = rpc(&app, "cr_redeem_code", json!({"code": "OLD-CODE", "avId": 42})).await;
    assert_eq!(envelope["error"]["code"], json!(9998));
    assert_eq!(envelope["error"]["message"], json!("Code is expired."));
}

#[tokio::test]
async fn test_view_lot_filters() {
    let (state, app) = test_app();
    rpc(&app, "cr_create_lot", auto_lot_params("launch-party", 3)).await;

    let lot = state.lots.get("launch-party").unwrap();
    let code = lot.codes[0].display.clone();
    rpc(&app, "cr_redeem_code", json!({"code": code, "avId": 42})).await;

    let all = rpc(
        &app,
        "cr_view_lot_details",
        json!({"lotName": "launch-party", "justCode": false, "filterOption": "All Codes"}),
    )
    .await;
    assert_eq!(detail_rows(&all["result"], "lookupResults").len(), 3);

    let redeemed = rpc(
        &app,
        "cr_view_lot_details",
        json!({"lotName": "launch-party", "justCode": false, "filterOption": "Redeemed Codes"}),
    )
    .await;
    let rows = detail_rows(&redeemed["result"], "lookupResults");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["redeemedAvId"], json!("42"));

    let redeemable = rpc(
        &app,
        "cr_view_lot_details",
        json!({"lotName": "launch-party", "justCode": false, "filterOption": "Redeemable Codes"}),
    )
    .await;
    assert_eq!(detail_rows(&redeemable["result"], "lookupResults").len(), 2);
}

#[tokio::test]
async fn test_view_lot_just_code_trims_columns() {
    let (_state, app) = test_app();
    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;

    let envelope = rpc(
        &app,
        "cr_view_lot_details",
        json!({"lotName": "summer-event", "justCode": true, "filterOption": "All Codes"}),
    )
    .await;
    let rows = detail_rows(&envelope["result"], "lookupResults");
    assert_eq!(rows[0].as_object().unwrap().len(), 1);
    assert_eq!(rows[0]["code"], json!("SUMMER-2026"));
}

#[tokio::test]
async fn test_view_unknown_lot_is_9998() {
    let (_state, app) = test_app();
    let envelope = rpc(
        &app,
        "cr_view_lot_details",
        json!({"lotName": "no-such-lot", "justCode": true, "filterOption": "All Codes"}),
    )
    .await;
    assert_eq!(envelope["error"]["code"], json!(9998));
}

#[tokio::test]
async fn test_lookup_by_code_and_by_avatar() {
    let (_state, app) = test_app();
    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;
    rpc(&app, "cr_redeem_code", json!({"code": "SUMMER-2026", "avId": 42})).await;

    let by_code = rpc(&app, "cr_lookup", json!({"code": "SUMMER-2026", "avId": null})).await;
    let rows = detail_rows(&by_code["result"], "lookupResults");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["redemptions"], json!("1"));

    let by_avatar = rpc(&app, "cr_lookup", json!({"code": null, "avId": 42})).await;
    let rows = detail_rows(&by_avatar["result"], "lookupResults");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["code"], json!("SUMMER-2026"));

    let nobody = rpc(&app, "cr_lookup", json!({"code": null, "avId": 999})).await;
    assert_eq!(nobody["error"]["code"], json!(9998));
}

#[tokio::test]
async fn test_modify_and_delete_lot() {
    let (state, app) = test_app();
    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;

    let modified = rpc(
        &app,
        "cr_modify_lot",
        json!({"lotName": "summer-event", "expirationMonth": 12, "expirationDay": 31, "expirationYear": 2026}),
    )
    .await;
    assert!(modified.get("error").is_none());
    assert_eq!(
        state.lots.get("summer-event").unwrap().expiration,
        Some(chrono::NaiveDate::from_ymd_opt(2026, 12, 31).unwrap())
    );

    let deleted = rpc(&app, "cr_delete_lot", json!({"lotName": "summer-event"})).await;
    assert_eq!(
        deleted["result"]["message"],
        json!("Successfully deleted lot summer-event.")
    );

    let missing = rpc(&app, "cr_delete_lot", json!({"lotName": "summer-event"})).await;
    assert_eq!(missing["error"]["code"], json!(9998));
}

#[tokio::test]
async fn test_lot_names_and_has_lots() {
    let (_state, app) = test_app();

    let empty = rpc(&app, "cr_check_for_current_lots", json!({})).await;
    assert_eq!(empty["result"]["hasLots"], json!(false));

    rpc(&app, "cr_create_lot", manual_lot_params("b-event", "CODE-B")).await;
    rpc(&app, "cr_create_lot", manual_lot_params("a-event", "CODE-A")).await;

    let has = rpc(&app, "cr_check_for_current_lots", json!({})).await;
    assert_eq!(has["result"]["hasLots"], json!(true));

    let names = rpc(&app, "cr_get_lot_names", json!({})).await;
    assert_eq!(names["result"]["lots"], json!(["a-event", "b-event"]));
}

#[tokio::test]
async fn test_rewards_catalog_shape() {
    let (_state, app) = test_app();
    rpc(&app, "cr_create_lot", manual_lot_params("summer-event", "SUMMER-2026")).await;

    let envelope = rpc(&app, "cr_get_rewards", json!({})).await;
    let result = &envelope["result"];

    assert!(result["awardChoices"].as_array().unwrap().len() >= 2);
    assert_eq!(result["allowAutoGenerated"], json!(true));
    assert_eq!(result["maxCodeLength"], json!(16));
    assert_eq!(result["lotNames"], json!(["summer-event"]));
}

/// 停服开关：打开后所有方法统一回 9999
#[tokio::test]
async fn test_unavailable_mode_returns_9999() {
    let (state, app) = test_app();
    state.set_available(false);

    for method in ["cr_get_lot_names", "cr_redeem_code", "cr_create_lot"] {
        let envelope = rpc(&app, method, json!({})).await;
        assert_eq!(envelope["error"]["code"], json!(9999), "method={method}");
        assert_eq!(
            envelope["error"]["message"],
            json!("Code redemption is unavailable.")
        );
    }

    state.set_available(true);
    let envelope = rpc(&app, "cr_get_lot_names", json!({})).await;
    assert!(envelope.get("error").is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let (_state, app) = test_app();
    let envelope = rpc(&app, "cr_no_such_method", json!({})).await;
    assert_eq!(envelope["error"]["code"], json!(-32601));
}

#[tokio::test]
async fn test_seed_demo_data() {
    let (state, app) = test_app();
    state.seed_demo_data();

    let names = rpc(&app, "cr_get_lot_names", json!({})).await;
    assert_eq!(
        names["result"]["lots"],
        json!(["launch-party", "welcome-gift"])
    );

    let envelope = rpc(&app, "cr_redeem_code", json!({"code": "WELCOME-2026", "avId": 42})).await;
    assert!(envelope.get("error").is_none());
}
