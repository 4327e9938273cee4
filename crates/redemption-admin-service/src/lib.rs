//! 码兑换管理控制台（运营端）
//!
//! 面向运营的码批管理 REST API：创建、查看、修改、删除码批，
//! 查询与兑换单个码。控制台自身不落任何数据——所有操作经
//! 上游游戏后端的单一 RPC 端点完成，这里只负责表单校验、
//! 参数整形和响应转译。
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `rpc`: 上游 RPC 客户端
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator（配合 code-dict 的码字符合法性判定）
//! - 序列化：serde (camelCase)
//! - 上游调用：reqwest

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod rpc;
pub mod state;

// 重新导出核心类型
pub use dto::{
    CodeLotDetails, CodeType, CreateLotForm, DeleteLotForm, FilterOption, HasExpiration,
    LookupForm, LookupMode, LookupResponse, LotMutationResponse, ModifyLotForm, RedeemCodeForm,
    RedeemResponse, ViewLotForm,
};
pub use error::{ConsoleError, Result};
pub use rpc::UberdogClient;
pub use state::AppState;
