//! Health Check Handler

use axum::http::StatusCode;

/// 存活探针 - 固定返回 204，空响应体
pub async fn health_check() -> StatusCode {
    StatusCode::NO_CONTENT
}
