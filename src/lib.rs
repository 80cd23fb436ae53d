//! piperd - Piper TTS HTTP 服务
//!
//! 把文本交给预训练的 Piper 音色模型合成语音，装进 WAV 容器返回。
//!
//! 分层:
//! - domain: VoiceId 值对象、WAV 容器构建/解析
//! - application: 端口定义、音色库（扫描/加载/缓存）、合成用例
//! - infrastructure: HTTP API、引擎适配器

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
