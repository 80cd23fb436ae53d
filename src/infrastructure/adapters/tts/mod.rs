//! TTS Engine Adapters

mod fake;
mod piper_process;

pub use fake::FakeTtsEngine;
pub use piper_process::{PiperProcessConfig, PiperProcessEngine};
