use async_trait::async_trait;

/// Errors raised while turning an utterance into text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Unintelligible audio: {0}")]
    Unintelligible(String),
}

impl From<reqwest::Error> for TranscriptionError {
    fn from(err: reqwest::Error) -> Self {
        TranscriptionError::NetworkError(err.to_string())
    }
}

/// Speech-to-text capability consumed by the session.
///
/// Implementations receive the cropped utterance as 8 kHz mono 16-bit PCM.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[i16]) -> Result<String, TranscriptionError>;
}
