//! Piper Process Engine - 驱动 piper 可执行文件的合成适配器
//!
//! 每次合成启动一个子进程:
//! `piper --model <id>.onnx --config <id>.onnx.json --output-raw`
//! 文本写入 stdin，s16le 单声道 PCM 从 stdout 流式读出并切成音频块。
//! 采样率取自模型的伴随 JSON 配置。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::application::ports::{AudioChunk, AudioChunkStream, TtsEnginePort, TtsError, VoiceHandle};

/// stdout 每次读取的缓冲大小 (8 KiB ≈ 4096 帧 s16le mono)
const READ_BUF_SIZE: usize = 8 * 1024;

/// Piper 进程引擎配置
#[derive(Debug, Clone)]
pub struct PiperProcessConfig {
    /// piper 可执行文件路径
    pub binary: PathBuf,
}

impl Default for PiperProcessConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("piper"),
        }
    }
}

/// Piper 进程引擎
pub struct PiperProcessEngine {
    config: PiperProcessConfig,
}

impl PiperProcessEngine {
    pub fn new(config: PiperProcessConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PiperProcessConfig::default())
    }
}

/// 模型配置文件中我们关心的部分
#[derive(Debug, Deserialize)]
struct PiperModelConfig {
    #[serde(default)]
    audio: PiperAudioConfig,
}

#[derive(Debug, Deserialize)]
struct PiperAudioConfig {
    #[serde(default = "default_sample_rate")]
    sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    22050
}

impl Default for PiperAudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

fn parse_sample_rate(raw: &[u8]) -> Result<u32, TtsError> {
    let config: PiperModelConfig =
        serde_json::from_slice(raw).map_err(|e| TtsError::InvalidConfig(e.to_string()))?;
    Ok(config.audio.sample_rate)
}

#[async_trait]
impl TtsEnginePort for PiperProcessEngine {
    async fn load_model(
        &self,
        model_path: &Path,
        config_path: &Path,
    ) -> Result<Arc<dyn VoiceHandle>, TtsError> {
        let raw = tokio::fs::read(config_path).await.map_err(|e| {
            TtsError::LoadError(format!(
                "Failed to read model config {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let sample_rate = parse_sample_rate(&raw)?;

        tracing::info!(
            model = %model_path.display(),
            sample_rate,
            "Piper voice model ready"
        );

        Ok(Arc::new(PiperVoice {
            binary: self.config.binary.clone(),
            model_path: model_path.to_path_buf(),
            config_path: config_path.to_path_buf(),
            sample_rate,
        }))
    }
}

/// 一个已解析的 piper 音色
///
/// 进程在 synthesize 时才启动，句柄本身只持有路径和采样率。
struct PiperVoice {
    binary: PathBuf,
    model_path: PathBuf,
    config_path: PathBuf,
    sample_rate: u32,
}

#[async_trait]
impl VoiceHandle for PiperVoice {
    async fn synthesize(&self, text: &str) -> Result<AudioChunkStream, TtsError> {
        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&self.model_path)
            .arg("--config")
            .arg(&self.config_path)
            .arg("--output-raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TtsError::SynthesisError(format!("Failed to spawn piper: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TtsError::SynthesisError("piper stdin unavailable".to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| TtsError::SynthesisError("piper stdout unavailable".to_string()))?;
        let stderr = child.stderr.take();

        // stderr 独立排空: 引擎的告警输出写满管道缓冲区会反过来
        // 卡住 stdout，必须与读取并行消费
        let stderr_task = tokio::spawn(async move {
            let mut detail = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut detail).await;
            }
            detail
        });

        // 独立任务喂入文本，与 stdout 读取并行，避免管道互相阻塞
        let mut text = text.to_owned();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                tracing::warn!(error = %e, "Failed to write text to piper stdin");
            }
            // drop 关闭管道，通知 piper 输入结束
        });

        let sample_rate = self.sample_rate;
        let stream = try_stream! {
            let mut buf = vec![0u8; READ_BUF_SIZE];
            loop {
                let n = stdout.read(&mut buf).await.map_err(|e| {
                    TtsError::SynthesisError(format!("Failed to read piper output: {}", e))
                })?;
                if n == 0 {
                    break;
                }
                yield AudioChunk {
                    channels: 1,
                    sample_width: 2,
                    sample_rate,
                    samples: buf[..n].to_vec(),
                };
            }

            let status = child.wait().await.map_err(|e| {
                TtsError::SynthesisError(format!("Failed to wait for piper: {}", e))
            })?;
            if !status.success() {
                let detail = stderr_task.await.unwrap_or_default();
                Err(TtsError::SynthesisError(format!(
                    "piper exited with {}: {}",
                    status,
                    detail.trim()
                )))?;
            }
        };

        Ok(Box::pin(stream))
    }
}
