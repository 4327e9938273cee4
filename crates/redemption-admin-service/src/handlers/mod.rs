//! HTTP 请求处理器模块

pub mod lookup;
pub mod lot;
pub mod menu;
pub mod redeem;
