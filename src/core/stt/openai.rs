//! OpenAI-compatible batch transcription.
//!
//! Each finished utterance is wrapped as an 8 kHz WAV file and posted to
//! `{base_url}/audio/transcriptions` as multipart form data. The JSON response
//! carries the transcript in its `text` field.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::base::{Transcriber, TranscriptionError};
use crate::core::audio::to_wav;
use crate::core::codec::{SAMPLE_RATE, samples_to_ms};
use crate::core::providers::openai::{OpenAIConfig, error_body, http_client};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Clone)]
pub struct OpenAITranscriber {
    client: reqwest::Client,
    config: OpenAIConfig,
    model: String,
}

impl OpenAITranscriber {
    pub fn new(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            config,
            model: model.into(),
        }
    }

    fn build_http_request(&self, audio: &[i16]) -> Result<reqwest::RequestBuilder, TranscriptionError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            TranscriptionError::ConfigurationError("OPENAI_API_KEY is not set".to_string())
        })?;

        let wav = to_wav(audio, SAMPLE_RATE)
            .map_err(|e| TranscriptionError::AudioProcessingError(e.to_string()))?;
        let file = Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "json");

        Ok(self
            .client
            .post(self.config.endpoint("audio/transcriptions"))
            .bearer_auth(api_key)
            .multipart(form))
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio: &[i16]) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::Unintelligible(
                "utterance contains no audio".to_string(),
            ));
        }

        debug!(
            "Transcribing {}ms of audio with model={}",
            samples_to_ms(audio.len()),
            self.model
        );

        let response = self.build_http_request(audio)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(TranscriptionError::ProviderError(format!(
                "HTTP {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ProviderError(format!("Invalid response: {e}")))?;
        Ok(parsed.text)
    }
}
