//! Fake TTS Engine - 用于测试和离线开发的引擎
//!
//! 按脚本返回固定的音频块，不读取模型文件。
//! 带调用计数，可验证缓存命中后不再触发加载。

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream;

use crate::application::ports::{AudioChunk, AudioChunkStream, TtsEnginePort, TtsError, VoiceHandle};

/// 脚本条目: 正常块或中途失败
type ScriptItem = Result<AudioChunk, String>;

/// Fake TTS Engine
pub struct FakeTtsEngine {
    script: Vec<ScriptItem>,
    load_calls: Arc<AtomicUsize>,
    synth_calls: Arc<AtomicUsize>,
}

impl FakeTtsEngine {
    /// 默认脚本: 一块 100ms 的 22050Hz 单声道静音
    pub fn new() -> Self {
        let silence = AudioChunk {
            channels: 1,
            sample_width: 2,
            sample_rate: 22050,
            samples: vec![0u8; 2205 * 2],
        };
        Self::with_chunks(vec![silence])
    }

    /// 依次返回给定的音频块
    pub fn with_chunks(chunks: Vec<AudioChunk>) -> Self {
        Self {
            script: chunks.into_iter().map(Ok).collect(),
            load_calls: Arc::new(AtomicUsize::new(0)),
            synth_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 返回给定的块后以错误结束流
    pub fn failing_after(chunks: Vec<AudioChunk>, error: impl Into<String>) -> Self {
        let mut script: Vec<ScriptItem> = chunks.into_iter().map(Ok).collect();
        script.push(Err(error.into()));
        Self {
            script,
            load_calls: Arc::new(AtomicUsize::new(0)),
            synth_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 引擎加载被调用的次数
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// 合成被调用的次数
    pub fn synth_calls(&self) -> usize {
        self.synth_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeTtsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsEngine {
    async fn load_model(
        &self,
        model_path: &Path,
        _config_path: &Path,
    ) -> Result<Arc<dyn VoiceHandle>, TtsError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(model = %model_path.display(), "FakeTtsEngine: loading model");

        Ok(Arc::new(FakeVoiceHandle {
            script: self.script.clone(),
            synth_calls: self.synth_calls.clone(),
        }))
    }
}

struct FakeVoiceHandle {
    script: Vec<ScriptItem>,
    synth_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl VoiceHandle for FakeVoiceHandle {
    async fn synthesize(&self, text: &str) -> Result<AudioChunkStream, TtsError> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(text_len = text.len(), "FakeTtsEngine: returning scripted audio");

        let items: Vec<Result<AudioChunk, TtsError>> = self
            .script
            .iter()
            .map(|item| item.clone().map_err(TtsError::SynthesisError))
            .collect();

        Ok(Box::pin(stream::iter(items)))
    }
}
