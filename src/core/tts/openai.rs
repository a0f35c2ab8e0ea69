//! OpenAI-compatible speech synthesis.
//!
//! Requests raw PCM from `{base_url}/audio/speech`. The API returns 24 kHz
//! little-endian 16-bit mono, which is resampled to the 8 kHz wire rate.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::base::{SynthesisError, Synthesizer};
use crate::core::audio::{pcm16le_to_samples, resample};
use crate::core::codec::SAMPLE_RATE;
use crate::core::providers::openai::{OpenAIConfig, error_body, http_client};

/// Sample rate of `response_format: "pcm"` output.
pub const OPENAI_PCM_SAMPLE_RATE: u32 = 24000;

#[derive(Debug, Clone)]
pub struct OpenAISynthesizer {
    client: reqwest::Client,
    config: OpenAIConfig,
    model: String,
    voice: String,
}

impl OpenAISynthesizer {
    pub fn new(config: OpenAIConfig, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            config,
            model: model.into(),
            voice: voice.into(),
        }
    }

    fn build_http_request(&self, text: &str) -> Result<reqwest::RequestBuilder, SynthesisError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            SynthesisError::ConfigurationError("OPENAI_API_KEY is not set".to_string())
        })?;

        let body = json!({
            "model": &self.model,
            "input": text,
            "voice": &self.voice,
            "response_format": "pcm"
        });

        debug!(
            "Building OpenAI TTS request: model={}, voice={}",
            self.model, self.voice
        );

        Ok(self
            .client
            .post(self.config.endpoint("audio/speech"))
            .bearer_auth(api_key)
            .json(&body))
    }
}

#[async_trait]
impl Synthesizer for OpenAISynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<i16>, SynthesisError> {
        let response = self.build_http_request(text)?.send().await?;

        let status = response.status();
        if status.is_server_error() {
            let body = error_body(response).await;
            return Err(SynthesisError::Unavailable(format!("HTTP {status}: {body}")));
        }
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(SynthesisError::ProviderError(format!("HTTP {status}: {body}")));
        }

        let bytes = response.bytes().await?;
        let pcm = pcm16le_to_samples(&bytes);
        Ok(resample(&pcm, OPENAI_PCM_SAMPLE_RATE, SAMPLE_RATE)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    fn synthesizer(server: &MockServer, api_key: Option<&str>) -> OpenAISynthesizer {
        OpenAISynthesizer::new(
            OpenAIConfig::new(api_key.map(String::from), server.uri()),
            "tts-1",
            "alloy",
        )
    }

    #[test]
    fn test_build_http_request() {
        let synth = OpenAISynthesizer::new(
            OpenAIConfig::new(Some("sk-test".into()), "https://example.com/v1"),
            "tts-1",
            "nova",
        );
        let request = synth
            .build_http_request("Hello")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "https://example.com/v1/audio/speech");
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer sk-test"
        );
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["voice"], "nova");
        assert_eq!(body["response_format"], "pcm");
    }

    #[tokio::test]
    async fn test_synthesize_resamples_to_wire_rate() {
        let mock_server = MockServer::start().await;

        // 100 ms of a steady 24 kHz level.
        let pcm: Vec<u8> = [4000i16; 2400]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "model": "tts-1",
                "input": "Hi",
                "voice": "alloy",
                "response_format": "pcm"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(pcm))
            .expect(1)
            .mount(&mock_server)
            .await;

        let audio = synthesizer(&mock_server, Some("sk-test"))
            .synthesize("Hi")
            .await
            .unwrap();
        assert_eq!(audio.len(), 800);
        assert!((audio[400] - 4000).abs() <= 40);
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let err = synthesizer(&mock_server, Some("sk-test"))
            .synthesize("Hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Unavailable(msg) if msg.contains("overloaded")));
    }

    #[tokio::test]
    async fn test_client_error_is_provider_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid key"))
            .mount(&mock_server)
            .await;

        let err = synthesizer(&mock_server, Some("sk-bad"))
            .synthesize("Hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::ProviderError(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let mock_server = MockServer::start().await;
        let err = synthesizer(&mock_server, None)
            .synthesize("Hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::ConfigurationError(_)));
    }
}
