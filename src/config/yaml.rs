use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Environment
/// variables fill anything the file leaves unset.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   public_stream_url: "wss://voice.example.com/stream"
///
/// session:
///   greeting: "Hey! How can I help you?"
///   mark_label: "ack"
///   playback_chunk_bytes: 8000
///
/// vad:
///   energy_threshold: 500.0
///   window_ms: 20
///   onset_ms: 60
///   silence_ms: 800
///   padding_ms: 100
///   max_utterance_ms: 30000
///
/// providers:
///   openai_api_key: "sk-..."
///   openai_base_url: "https://api.openai.com/v1"
///   stt_model: "whisper-1"
///   tts_model: "tts-1"
///   tts_voice: "alloy"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub session: Option<SessionYaml>,
    pub vad: Option<VadYaml>,
    pub providers: Option<ProvidersYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_stream_url: Option<String>,
}

/// Per-call session behavior from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionYaml {
    pub greeting: Option<String>,
    pub mark_label: Option<String>,
    pub playback_chunk_bytes: Option<usize>,
}

/// Voice activity detection tuning from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VadYaml {
    pub energy_threshold: Option<f32>,
    pub window_ms: Option<u64>,
    pub onset_ms: Option<u64>,
    pub silence_ms: Option<u64>,
    pub padding_ms: Option<u64>,
    pub max_utterance_ms: Option<u64>,
}

/// Speech provider settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub stt_model: Option<String>,
    pub tts_model: Option<String>,
    pub tts_voice: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;
        Ok(config)
    }
}
