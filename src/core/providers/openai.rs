//! Connection settings for OpenAI-compatible speech endpoints.

use reqwest::{Client, Response};
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Request timeout for a single transcription or synthesis call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies are capped before they end up in logs.
const MAX_ERROR_BODY_LEN: usize = 500;

/// API credentials and base URL shared by the OpenAI speech clients.
#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl OpenAIConfig {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
        }
    }

    /// Full URL for an endpoint path such as `audio/speech`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// The API key, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

/// HTTP client with the provider request timeout and connection pooling.
pub fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_default()
}

/// Read a failed response body, truncated for logging.
pub async fn error_body(response: Response) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());

    if body.chars().count() > MAX_ERROR_BODY_LEN {
        let capped: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{capped}... (truncated)")
    } else {
        body
    }
}
