mod base;
pub mod openai;

// Re-export public types and traits
pub use base::{Transcriber, TranscriptionError};

pub use openai::OpenAITranscriber;

/// Default transcription model.
pub const DEFAULT_STT_MODEL: &str = "whisper-1";
