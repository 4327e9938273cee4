//! Mock 数据模型

use chrono::{DateTime, NaiveDate, Utc};
use code_dict::IGNORED_MANUAL_CHARACTERS;
use serde_json::{Map, Value, json};

/// 码的比对形式：统一大写并去掉填充字符（连字符、空格）。
/// `ABC-123`、`abc 123`、`ABC123` 指向同一个码。
pub fn canonicalize(code: &str) -> String {
    code.chars()
        .filter(|c| !IGNORED_MANUAL_CHARACTERS.contains(*c))
        .flat_map(char::to_uppercase)
        .collect()
}

/// 一个兑换码
#[derive(Debug, Clone)]
pub struct MockCode {
    /// 展示形式（保留原始大小写和填充字符）
    pub display: String,
    /// 比对形式
    pub canonical: String,
    /// 兑换过的角色 ID；unique 码最多一个，手工码不限
    pub redeemed_by: Vec<u64>,
}

impl MockCode {
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let canonical = canonicalize(&display);
        Self {
            display,
            canonical,
            redeemed_by: Vec::new(),
        }
    }
}

/// 一个码批
#[derive(Debug, Clone)]
pub struct MockLot {
    pub name: String,
    /// 手工码批：一个共用码，多人可兑；否则为自动生成码批
    pub manual: bool,
    pub reward_type: i64,
    pub reward_item_id: i64,
    pub reward_category: String,
    pub reward_item: String,
    pub created_at: DateTime<Utc>,
    pub expiration: Option<NaiveDate>,
    pub codes: Vec<MockCode>,
}

impl MockLot {
    pub fn is_expired_at(&self, today: NaiveDate) -> bool {
        self.expiration.is_some_and(|exp| exp < today)
    }

    /// 一个码当前是否还能兑换：批未过期，且（手工码恒可兑，
    /// unique 码未被兑过）。
    pub fn is_redeemable(&self, code: &MockCode, today: NaiveDate) -> bool {
        if self.is_expired_at(today) {
            return false;
        }
        self.manual || code.redeemed_by.is_empty()
    }

    /// 把一个码渲染成明细行。
    ///
    /// justCode 时只保留 code 列；其余情况下输出全部列，
    /// 字段值统一是字符串（前端表格按字段出现与否决定渲染哪些列）。
    pub fn detail_row(&self, code: &MockCode, just_code: bool) -> Value {
        let mut row = Map::new();
        row.insert("code".into(), json!(code.display));

        if just_code {
            return Value::Object(row);
        }

        row.insert(
            "creation".into(),
            json!(self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        if let Some(exp) = self.expiration {
            row.insert("expiration".into(), json!(exp.format("%Y-%m-%d").to_string()));
        }
        row.insert(
            "manual".into(),
            json!(if self.manual { "yes" } else { "no" }),
        );
        row.insert("rewardCategory".into(), json!(self.reward_category));
        row.insert("rewardItem".into(), json!(self.reward_item));
        if !code.redeemed_by.is_empty() {
            let av_ids: Vec<String> = code.redeemed_by.iter().map(u64::to_string).collect();
            row.insert("redeemedAvId".into(), json!(av_ids.join(", ")));
        }
        row.insert("redemptions".into(), json!(code.redeemed_by.len().to_string()));

        Value::Object(row)
    }
}
