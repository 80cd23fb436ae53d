//! TTS Engine Port - 合成引擎抽象
//!
//! 引擎被视为黑盒能力: `load_model(model, config) -> VoiceHandle`，
//! `VoiceHandle::synthesize(text) -> AudioChunk 流`。
//! 具体实现在 infrastructure/adapters 层。

use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::Stream;
use thiserror::Error;

/// TTS 引擎错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Failed to load voice model: {0}")]
    LoadError(String),

    #[error("Invalid model config: {0}")]
    InvalidConfig(String),

    #[error("Synthesis failed: {0}")]
    SynthesisError(String),
}

/// 一段合成音频 (s16le PCM)
///
/// 同一次合成调用产出的所有块共享 channels/sample_width/sample_rate。
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// 声道数
    pub channels: u16,
    /// 每个样本的字节数
    pub sample_width: u16,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 原始样本字节
    pub samples: Vec<u8>,
}

/// 合成结果流
///
/// 惰性有限序列，不可重放，可能中途失败。
pub type AudioChunkStream = Pin<Box<dyn Stream<Item = Result<AudioChunk, TtsError>> + Send>>;

/// 已加载的音色模型句柄
///
/// 由音色缓存独占持有，通过 `Arc` 在并发请求间只读共享。
#[async_trait]
pub trait VoiceHandle: Send + Sync {
    /// 合成文本，返回音频块流
    async fn synthesize(&self, text: &str) -> Result<AudioChunkStream, TtsError>;
}

/// TTS Engine Port
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 从模型文件和伴随配置文件加载音色模型
    async fn load_model(
        &self,
        model_path: &Path,
        config_path: &Path,
    ) -> Result<Arc<dyn VoiceHandle>, TtsError>;
}
