//! Domain Layer - 领域层
//!
//! 纯逻辑，不依赖基础设施:
//! - voice: 音色标识值对象
//! - wav: WAV 容器构建与解析

pub mod voice;
pub mod wav;

pub use voice::VoiceId;
