//! 管理后台错误类型定义
//!
//! 错误最终都会落到统一的 JSON 响应体上：
//! `{"success": false, "error": <标签>, "errorCode"?: <上游错误码>, "message"?: <描述>}`。
//! 上游 RPC 报告的业务错误码（9996/9997/9998/9999）原样透传给前端，
//! 由前端的错误码分支决定表单报错还是跳转不可用页。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// 表单数据不合法
    #[error("{0}")]
    Validation(String),

    /// 上游 RPC 返回了错误（或返回体里没有 result）。
    /// code/message 都可能缺失：上游偶尔只回一个空壳错误。
    #[error("upstream rpc error (code {code:?})")]
    Upstream {
        code: Option<i64>,
        message: Option<String>,
    },

    /// 上游无法连接、超时或回了非 2xx
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// 上游返回了无法解析的载荷
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// 其余内部错误
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            // 上游业务错误沿用 400：前端靠 errorCode 细分，不靠状态码
            Self::Upstream { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamUnreachable(_) | Self::MalformedUpstreamResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回响应体 `error` 字段的标签
    pub fn error_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Upstream { .. } => "Internal Server Error",
            Self::UpstreamUnreachable(_) | Self::MalformedUpstreamResponse(_) => {
                "Upstream Unavailable"
            }
            Self::Internal(_) => "Internal Server Error",
        }
    }

    /// 上游业务错误码（仅 Upstream 变体携带）
    pub fn upstream_code(&self) -> Option<i64> {
        match self {
            Self::Upstream { code, .. } => *code,
            _ => None,
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，细节仅记录日志
        let message = match &self {
            Self::Validation(msg) => Some(msg.clone()),
            Self::Upstream { message, .. } => message.clone(),
            Self::UpstreamUnreachable(e) => {
                tracing::error!(error = %e, "upstream request failed");
                Some("System is unavailable, please try again later.".to_string())
            }
            Self::MalformedUpstreamResponse(e) => {
                tracing::error!(error = %e, "upstream returned malformed payload");
                Some("System is unavailable, please try again later.".to_string())
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                None
            }
        };

        let mut body = json!({
            "success": false,
            "error": self.error_label(),
        });

        if let Some(code) = self.upstream_code() {
            body["errorCode"] = json!(code);
        }
        if let Some(message) = message {
            body["message"] = json!(message);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ConsoleError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 reqwest 错误转换：到不了上游都算 unreachable
impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamUnreachable(err.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ConsoleError>;
