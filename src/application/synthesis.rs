//! Synthesis Use Case - 文本合成编排
//!
//! 校验输入 → 加载音色 → 完整消费音频块流 → 组装 WAV。

use std::sync::Arc;

use futures_util::StreamExt;

use crate::application::error::ApplicationError;
use crate::application::voice_library::VoiceLibrary;
use crate::domain::wav::{build_wav, PcmSpec};
use crate::domain::VoiceId;

/// 合成命令
#[derive(Debug, Clone)]
pub struct SynthesizeText {
    pub text: String,
    pub voice: String,
}

/// 合成处理器
pub struct SynthesizeTextHandler {
    voices: Arc<VoiceLibrary>,
}

impl SynthesizeTextHandler {
    pub fn new(voices: Arc<VoiceLibrary>) -> Self {
        Self { voices }
    }

    /// 执行合成，返回完整 WAV 字节流
    pub async fn handle(&self, command: SynthesizeText) -> Result<Vec<u8>, ApplicationError> {
        // 参数校验先于任何磁盘访问
        if command.text.is_empty() {
            return Err(ApplicationError::Validation(
                "Field 'text' is required".to_string(),
            ));
        }
        let voice_id = VoiceId::new(&command.voice)
            .map_err(|e| ApplicationError::Validation(format!("Invalid voice: {}", e)))?;

        let handle = self.voices.load(&voice_id).await?;

        tracing::info!(voice = %voice_id, text_len = command.text.len(), "Synthesizing text");

        let mut stream = handle.synthesize(&command.text).await?;

        // 流不可重放且可能中途失败，先完整消费再继续
        let mut spec: Option<PcmSpec> = None;
        let mut samples: Vec<u8> = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let chunk_spec = PcmSpec {
                channels: chunk.channels,
                sample_width: chunk.sample_width,
                sample_rate: chunk.sample_rate,
            };
            match spec {
                None => spec = Some(chunk_spec),
                // 引擎保证整次调用参数一致；观测到分歧只记录，仍沿用首块参数
                Some(first) if first != chunk_spec => {
                    tracing::warn!(
                        voice = %voice_id,
                        first = ?first,
                        current = ?chunk_spec,
                        "Audio chunk parameters diverge from first chunk"
                    );
                }
                Some(_) => {}
            }
            samples.extend_from_slice(&chunk.samples);
            chunks += 1;
        }

        let Some(spec) = spec else {
            tracing::warn!(voice = %voice_id, "Synthesis produced no audio chunks");
            return Err(ApplicationError::EmptyOutput);
        };

        tracing::debug!(
            voice = %voice_id,
            chunks,
            bytes = samples.len(),
            sample_rate = spec.sample_rate,
            "Synthesis complete"
        );

        Ok(build_wav(spec, &samples))
    }
}
