//! Application State

use std::sync::Arc;

use crate::application::{SynthesizeTextHandler, VoiceLibrary};

/// 应用状态
///
/// 音色库是唯一的进程级共享可变资源。
pub struct AppState {
    pub voices: Arc<VoiceLibrary>,
    pub synthesize_handler: SynthesizeTextHandler,
}

impl AppState {
    pub fn new(voices: Arc<VoiceLibrary>) -> Self {
        Self {
            synthesize_handler: SynthesizeTextHandler::new(voices.clone()),
            voices,
        }
    }
}
