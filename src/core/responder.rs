//! Response generation: what the agent says back.

use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResponseError {
    #[error("Response generation failed: {0}")]
    GenerationFailed(String),
}

/// Maps a caller transcript to the agent's reply text.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, text: &str) -> Result<String, ResponseError>;
}

/// Echoes the caller back. Useful as a default and for line checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParrotResponder;

#[async_trait]
impl Responder for ParrotResponder {
    async fn respond(&self, text: &str) -> Result<String, ResponseError> {
        Ok(format!("You said: \"{}\"", text.trim()))
    }
}
