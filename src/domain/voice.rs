//! Voice Context - Value Objects

use std::fmt;

/// 音色标识
///
/// 对应 voices 根目录下的一个子目录名，同时也是模型文件的主名:
/// `voices/<id>/<id>.onnx`
///
/// 不变量:
/// - 非空
/// - 不含路径分隔符或 `..`（标识会被拼接进文件路径）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        if name.is_empty() {
            return Err("voice id cannot be empty");
        }
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err("voice id cannot contain path separators");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
