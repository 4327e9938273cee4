//! Mock 服务模块

pub mod redemption_service;

#[cfg(test)]
mod redemption_service_tests;
