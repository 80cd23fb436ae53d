//! HTTP Error Handling
//!
//! 所有失败在这里转成 `{"error": ...}` JSON 响应，
//! 不让任何错误越过 HTTP 边界。服务端日志保留完整细节。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(error = %msg, "Resource not found");
                (StatusCode::NOT_FOUND, msg)
            }
            ApiError::Internal(msg) => {
                // 细节只进日志，客户端拿到通用消息
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Validation(msg) => ApiError::BadRequest(msg),
            ApplicationError::VoiceNotFound(id) => {
                ApiError::NotFound(format!("Voice '{}' not found", id))
            }
            ApplicationError::EmptyOutput => {
                ApiError::BadRequest(ApplicationError::EmptyOutput.to_string())
            }
            ApplicationError::Synthesis(msg) => ApiError::Internal(msg),
            ApplicationError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}
