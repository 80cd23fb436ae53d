//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine）
//! - voice_library: 音色扫描、加载与进程级缓存
//! - synthesis: 文本合成用例
//! - error: 应用层错误定义

pub mod error;
pub mod ports;
pub mod synthesis;
pub mod voice_library;

pub use error::ApplicationError;
pub use synthesis::{SynthesizeText, SynthesizeTextHandler};
pub use voice_library::VoiceLibrary;
