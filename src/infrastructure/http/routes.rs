//! HTTP Routes
//!
//! API Endpoints:
//! - /        GET   健康检查（204，空响应体）
//! - /voices  GET   列出已安装音色（JSON 字符串数组）
//! - /tts     POST  {"text", "voice"} → WAV 字节流

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/voices", get(handlers::list_voices))
        .route("/tts", post(handlers::synthesize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioChunk;
    use crate::application::VoiceLibrary;
    use crate::domain::wav::parse_wav;
    use crate::infrastructure::adapters::tts::FakeTtsEngine;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tower::util::ServiceExt;

    fn install_voice(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.onnx", name)), b"model").unwrap();
        fs::write(dir.join(format!("{}.onnx.json", name)), b"{}").unwrap();
    }

    fn chunk(samples: &[u8]) -> AudioChunk {
        AudioChunk {
            channels: 1,
            sample_width: 2,
            sample_rate: 22050,
            samples: samples.to_vec(),
        }
    }

    fn test_app(root: PathBuf, engine: Arc<FakeTtsEngine>) -> Router {
        let voices = Arc::new(VoiceLibrary::new(root, engine));
        create_routes().with_state(Arc::new(AppState::new(voices)))
    }

    fn tts_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/tts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path().to_path_buf(), Arc::new(FakeTtsEngine::new()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_list_voices_empty_root() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(
            tmp.path().join("missing"),
            Arc::new(FakeTtsEngine::new()),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/voices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let voices: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert!(voices.is_empty());
    }

    #[tokio::test]
    async fn test_list_voices_installed() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        install_voice(tmp.path(), "bruno");
        fs::create_dir_all(tmp.path().join("broken")).unwrap();

        let app = test_app(tmp.path().to_path_buf(), Arc::new(FakeTtsEngine::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/voices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let voices: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(voices, vec!["alba".to_string(), "bruno".to_string()]);
    }

    #[tokio::test]
    async fn test_tts_missing_fields_is_400_before_io() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeTtsEngine::new());
        let app = test_app(tmp.path().to_path_buf(), engine.clone());

        for body in [r#"{"voice": "alba"}"#, r#"{"text": "olá"}"#, "{}"] {
            let response = app.clone().oneshot(tts_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(error["error"].is_string());
        }

        assert_eq!(engine.load_calls(), 0);
    }

    #[tokio::test]
    async fn test_tts_unknown_voice_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path().to_path_buf(), Arc::new(FakeTtsEngine::new()));

        let response = app
            .oneshot(tts_request(r#"{"text": "olá", "voice": "ghost"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(error["error"].is_string());
    }

    #[tokio::test]
    async fn test_tts_success_returns_wav() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        let engine = Arc::new(FakeTtsEngine::with_chunks(vec![
            chunk(b"AAAA"),
            chunk(b"BBBB"),
        ]));
        let app = test_app(tmp.path().to_path_buf(), engine.clone());

        let response = app
            .clone()
            .oneshot(tts_request(r#"{"text": "olá mundo", "voice": "alba"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("audio/wav")
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed = parse_wav(&bytes).unwrap();
        assert_eq!(parsed.spec.channels, 1);
        assert_eq!(parsed.spec.sample_width, 2);
        assert_eq!(parsed.spec.sample_rate, 22050);
        assert_eq!(parsed.data, b"AAAABBBB");

        // 第二次请求同一音色命中缓存，引擎只加载过一次
        let response = app
            .oneshot(tts_request(r#"{"text": "de novo", "voice": "alba"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(engine.load_calls(), 1);
        assert_eq!(engine.synth_calls(), 2);
    }

    #[tokio::test]
    async fn test_tts_empty_output_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        let app = test_app(
            tmp.path().to_path_buf(),
            Arc::new(FakeTtsEngine::with_chunks(Vec::new())),
        );

        let response = app
            .oneshot(tts_request(r#"{"text": "!!!", "voice": "alba"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tts_engine_failure_is_500() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        let app = test_app(
            tmp.path().to_path_buf(),
            Arc::new(FakeTtsEngine::failing_after(
                vec![chunk(b"AAAA")],
                "engine crashed",
            )),
        );

        let response = app
            .oneshot(tts_request(r#"{"text": "olá", "voice": "alba"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(error["error"].is_string());
    }
}
