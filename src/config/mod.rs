//! Configuration module for the phonestream server
//!
//! This module handles server configuration from various sources: YAML files and
//! environment variables. When a YAML file is given its values win; environment
//! variables fill whatever it leaves unset, then built-in defaults apply.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use phonestream::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallback
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use crate::core::providers::{DEFAULT_OPENAI_BASE_URL, OpenAIConfig};
use crate::core::sequencer::DEFAULT_CHUNK_BYTES;
use crate::core::session::{DEFAULT_GREETING, DEFAULT_MARK_LABEL, SessionConfig};
use crate::core::stt::DEFAULT_STT_MODEL;
use crate::core::tts::{DEFAULT_TTS_MODEL, DEFAULT_TTS_VOICE};
use crate::core::vad::VADConfig;
use crate::core::vad::config::{
    DEFAULT_ENERGY_THRESHOLD, DEFAULT_MAX_UTTERANCE_MS, DEFAULT_ONSET_MS, DEFAULT_PADDING_MS,
    DEFAULT_SILENCE_MS, DEFAULT_WINDOW_MS,
};

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

/// Server configuration
///
/// Contains everything needed to run the server:
/// - Server settings (host, port, public stream URL)
/// - Session behavior (greeting, mark label, playback chunking)
/// - Voice activity detection tuning
/// - Speech provider settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// WebSocket URL handed to the telephony provider. Derived from the
    /// webhook request's `Host` header when unset.
    pub public_stream_url: Option<String>,

    // Session settings
    pub greeting: String,
    pub mark_label: String,
    pub playback_chunk_bytes: usize,

    // VAD settings
    pub vad_energy_threshold: f32,
    pub vad_window_ms: u64,
    pub vad_onset_ms: u64,
    pub vad_silence_ms: u64,
    pub vad_padding_ms: u64,
    pub vad_max_utterance_ms: u64,

    // Speech providers
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub stt_model: String,
    pub tts_model: String,
    pub tts_voice: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            public_stream_url: None,
            greeting: DEFAULT_GREETING.to_string(),
            mark_label: DEFAULT_MARK_LABEL.to_string(),
            playback_chunk_bytes: DEFAULT_CHUNK_BYTES,
            vad_energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            vad_window_ms: DEFAULT_WINDOW_MS,
            vad_onset_ms: DEFAULT_ONSET_MS,
            vad_silence_ms: DEFAULT_SILENCE_MS,
            vad_padding_ms: DEFAULT_PADDING_MS,
            vad_max_utterance_ms: DEFAULT_MAX_UTTERANCE_MS,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            stt_model: DEFAULT_STT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable fallback
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables
    /// 3. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // The .env file is deliberately not loaded here: the YAML file is the
        // source of truth and only real environment variables fill its gaps.
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Media stream URL to advertise in the call webhook response.
    ///
    /// # Arguments
    /// * `request_host` - `Host` header of the webhook request, if any
    pub fn stream_url(&self, request_host: Option<&str>) -> String {
        if let Some(url) = &self.public_stream_url {
            return url.clone();
        }
        let host = request_host
            .map(str::to_string)
            .unwrap_or_else(|| self.address());
        format!("wss://{host}/stream")
    }

    pub fn vad_config(&self) -> VADConfig {
        VADConfig {
            energy_threshold: self.vad_energy_threshold,
            window_ms: self.vad_window_ms,
            onset_ms: self.vad_onset_ms,
            silence_ms: self.vad_silence_ms,
            padding_ms: self.vad_padding_ms,
            max_utterance_ms: self.vad_max_utterance_ms,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            greeting: self.greeting.clone(),
            mark_label: self.mark_label.clone(),
            playback_chunk_bytes: self.playback_chunk_bytes,
            vad: self.vad_config(),
        }
    }

    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig::new(self.openai_api_key.clone(), self.openai_base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("PUBLIC_STREAM_URL");
            env::remove_var("GREETING");
            env::remove_var("VAD_SILENCE_MS");
            env::remove_var("OPENAI_API_KEY");
        }
    }

    #[test]
    fn test_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_stream_url_prefers_configured_url() {
        let config = ServerConfig {
            public_stream_url: Some("wss://voice.example.com/stream".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.stream_url(Some("ignored.ngrok.app")),
            "wss://voice.example.com/stream"
        );
    }

    #[test]
    fn test_stream_url_derived_from_host() {
        let config = ServerConfig::default();
        assert_eq!(
            config.stream_url(Some("abc.ngrok.app")),
            "wss://abc.ngrok.app/stream"
        );
        assert_eq!(config.stream_url(None), "wss://0.0.0.0:3001/stream");
    }

    #[test]
    fn test_derived_configs() {
        let config = ServerConfig {
            vad_silence_ms: 400,
            vad_max_utterance_ms: 12_000,
            mark_label: "done".to_string(),
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        let vad = config.vad_config();
        assert_eq!(vad.silence_ms, 400);
        assert_eq!(vad.onset_ms, 60);
        assert_eq!(vad.max_utterance_ms, 12_000);

        let session = config.session_config();
        assert_eq!(session.mark_label, "done");
        assert_eq!(session.greeting, "Hey! How can I help you?");
        assert_eq!(session.vad, vad);

        assert_eq!(config.openai_config().api_key(), Some("sk-test"));
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_wins_over_env() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "9999");
            env::set_var("GREETING", "From env");
            env::set_var("OPENAI_API_KEY", "sk-env");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
server:
  port: 4000
session:
  greeting: "Hello from YAML"
vad:
  silence_ms: 600
"#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.greeting, "Hello from YAML");
        assert_eq!(config.vad_silence_ms, 600);
        // Unset in YAML, so the environment fills it.
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-env"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_rejects_invalid_values() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
vad:
  window_ms: 20
  silence_ms: 10
"#,
        )
        .unwrap();

        let err = ServerConfig::from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("VAD_SILENCE_MS"));
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        let result = ServerConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
