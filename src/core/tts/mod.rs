mod base;
pub mod openai;

// Re-export public types and traits
pub use base::{SynthesisError, Synthesizer};

pub use openai::OpenAISynthesizer;

/// Default synthesis model.
pub const DEFAULT_TTS_MODEL: &str = "tts-1";

/// Default synthesis voice.
pub const DEFAULT_TTS_VOICE: &str = "alloy";
