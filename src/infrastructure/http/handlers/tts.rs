//! TTS HTTP Handler

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::SynthesizeText;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合成请求体
///
/// 两个字段都必填；缺失在 handler 里统一报 400，而不是交给反序列化失败。
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
}

/// 合成文本并以 WAV 返回
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TtsRequest>,
) -> Result<Response, ApiError> {
    let text = req.text.unwrap_or_default();
    let voice = req.voice.unwrap_or_default();
    if text.is_empty() || voice.is_empty() {
        return Err(ApiError::BadRequest(
            "Fields 'text' and 'voice' are required".to_string(),
        ));
    }

    let wav = state
        .synthesize_handler
        .handle(SynthesizeText { text, voice })
        .await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, wav.len())
        .body(Body::from(wav))
        .unwrap())
}
