//! Error types for the respond cycle

use crate::core::responder::ResponseError;
use crate::core::sequencer::SinkError;
use crate::core::stt::TranscriptionError;
use crate::core::tts::SynthesisError;
use crate::core::utterance::UtteranceError;

/// Reasons a respond cycle did not complete
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("Response failed: {0}")]
    Response(#[from] ResponseError),
    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("Outbound send failed: {0}")]
    Sink(#[from] SinkError),
    #[error("Utterance error: {0}")]
    Utterance(#[from] UtteranceError),
    #[error("Session has not started")]
    NotStarted,
    #[error("Session cancelled")]
    Cancelled,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
