//! 兑换码字符合法性判定
//!
//! 定义两套互斥用途的字符表：自动生成码（unique 码）使用 20 个
//! 无视觉歧义的字符，手工码（manual 码）使用全部大写字母加数字，
//! 外加连字符和空格两个仅作排版用途的填充字符。
//!
//! 所有判定都是纯函数，构造完成后没有任何可变状态，单个实例可以
//! 在任意多个请求任务间共享，无需加锁。

use std::sync::LazyLock;

/// 自动生成码的字符表。
///
/// 去掉了 O/0、I/1 这类易混淆字形以及会拼出单词的元音。
pub const UNIQUE_CHARACTERS: &str = "CDFGHJKLMNPQRVWX3469";

/// 手工码中允许出现、但不参与码值比对的填充字符（连字符和空格）。
pub const IGNORED_MANUAL_CHARACTERS: &str = "- ";

/// 手工码的完整字符表：大写字母 + 数字 + 填充字符。
pub const MANUAL_CHARACTERS: &str =
    concat!("ABCDEFGHIJKLMNOPQRSTUVWXYZ", "0123456789", "- ");

/// 进程级共享实例。
///
/// 构造只发生一次，之后只读，所有调用方直接引用即可。
pub static CODE_DICT: LazyLock<CodeDict> = LazyLock::new(CodeDict::new);

/// 兑换码字典
///
/// 持有从两张源字符表推导出的 manual-only 字符集。
/// 推导只在构造时发生一次，字段之后不再变化。
#[derive(Debug, Clone)]
pub struct CodeDict {
    /// 手工码专属字符：在手工码表中（填充字符除外）、但不在
    /// 自动生成码表中的字符。码里一旦出现这类字符，就不可能是
    /// 自动生成码。
    manual_only_characters: String,
    /// 预留的码空间与批量大小的比值系数，当前没有任何调用方。
    pub brute_force_factor: u32,
}

impl Default for CodeDict {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeDict {
    pub fn new() -> Self {
        let manual_only_characters: String = MANUAL_CHARACTERS
            .chars()
            .filter(|c| !IGNORED_MANUAL_CHARACTERS.contains(*c))
            .filter(|c| !UNIQUE_CHARACTERS.contains(*c))
            .collect();

        Self {
            manual_only_characters,
            brute_force_factor: 1000,
        }
    }

    /// 手工码专属字符集（推导结果）。
    pub fn manual_only_characters(&self) -> &str {
        &self.manual_only_characters
    }

    /// 码是否在某种码型规则下合法。
    ///
    /// 只回答“是否可能有效”，不区分它属于哪种码型。
    pub fn is_legal_code(&self, code: &str) -> bool {
        self.is_legal_unique_code(code) || self.is_legal_non_unique_code(code)
    }

    /// 是否为合法的自动生成码。
    ///
    /// 先整体转大写再逐字符检查，重复字符和顺序无关紧要；
    /// 空串没有可失败的字符，按约定返回 true。
    pub fn is_legal_unique_code(&self, code: &str) -> bool {
        code.to_uppercase()
            .chars()
            .all(|c| UNIQUE_CHARACTERS.contains(c))
    }

    /// 是否为合法的手工码。
    ///
    /// 逐字符按原样检查，不做大小写折叠——字符类本身对大小写
    /// 不敏感。空串同样按约定返回 true；“空码不允许提交”属于
    /// 表单层的职责，不在这里处理。
    pub fn is_legal_non_unique_code(&self, code: &str) -> bool {
        code.chars().all(|c| self.is_valid_manual_char(c))
    }

    /// 单个字符是否允许出现在手工码中。
    pub fn is_valid_manual_char(&self, c: char) -> bool {
        IGNORED_MANUAL_CHARACTERS.contains(c) || c.is_ascii_alphanumeric()
    }

    /// 单个字符是否只可能出现在手工码中。
    ///
    /// 任何不在自动生成码表中的 Unicode 字母或数字都算 manual-only。
    /// 这里刻意用 Unicode 分类而不是 ASCII 字符类，供输入框在用户
    /// 打字时做字符级过滤；两个顶层合法性检查都不调用它。
    pub fn is_manual_only_char(&self, c: char) -> bool {
        !UNIQUE_CHARACTERS.contains(c) && c.is_alphanumeric()
    }
}
