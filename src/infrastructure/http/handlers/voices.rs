//! Voice HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出已安装的音色
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let voices = state.voices.list_voices().await?;
    Ok(Json(voices))
}
