//! Mock 上游游戏后端
//!
//! 在内存里模拟码兑换 RPC 服务（uberdog）的全部方法，
//! 供管理后台的本地开发和集成测试使用。
//! 协议与真实上游一致：POST `{"method", "params"}`，
//! 返回 `{"jsonrpc", "id", "result" | "error"}` 信封。

pub mod models;
pub mod services;
pub mod store;

pub use models::{MockCode, MockLot};
pub use services::redemption_service::{RedemptionServiceState, rpc_routes};
pub use store::MemoryStore;
