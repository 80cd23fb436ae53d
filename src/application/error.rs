//! 应用层错误定义
//!
//! 所有失败在 HTTP 边界被捕获并转换为 JSON 错误响应，
//! 服务端记录完整细节，客户端只收到简短消息。

use thiserror::Error;

use crate::application::ports::TtsError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求参数缺失或无效
    #[error("Validation error: {0}")]
    Validation(String),

    /// 音色模型文件不存在
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// 合成没有产出任何音频 - 输入文本无效而非系统故障
    #[error("No audio could be produced for the given text; it may be too short or contain only unsupported characters")]
    EmptyOutput,

    /// 引擎合成失败（含中途失败）
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TtsError> for ApplicationError {
    fn from(e: TtsError) -> Self {
        match e {
            TtsError::SynthesisError(msg) => Self::Synthesis(msg),
            TtsError::LoadError(msg) | TtsError::InvalidConfig(msg) => Self::Internal(msg),
        }
    }
}
