//! HTTP Handlers

mod ping;
mod tts;
mod voices;

pub use ping::*;
pub use tts::*;
pub use voices::*;
