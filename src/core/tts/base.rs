use async_trait::async_trait;

use crate::core::audio::ResampleError;

/// Errors raised while synthesizing a response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Audio generation failed: {0}")]
    AudioGenerationFailed(String),
}

impl From<ResampleError> for SynthesisError {
    fn from(err: ResampleError) -> Self {
        SynthesisError::AudioGenerationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            SynthesisError::Unavailable(err.to_string())
        } else {
            SynthesisError::NetworkError(err.to_string())
        }
    }
}

/// Text-to-speech capability consumed by the session.
///
/// Implementations return 8 kHz mono 16-bit PCM ready for the wire codec.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<i16>, SynthesisError>;
}
