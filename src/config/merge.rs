use std::env;

use super::ServerConfig;
use super::utils::parse_env;
use super::yaml::YamlConfig;

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// # Arguments
/// * `yaml_config` - Optional YAML configuration to use as overrides
///
/// # Returns
/// * `Result<ServerConfig, Box<dyn std::error::Error>>` - The merged configuration or an error
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();
    let defaults = ServerConfig::default();

    // Helper macro to get value with priority: YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            $yaml_value
                .or_else(|| env::var($env_var).ok())
                .unwrap_or($default)
        };
    }

    // Helper macro for optional values: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            $yaml_value.or_else(|| env::var($env_var).ok())
        };
    }

    // Helper macro for parsed values: YAML > ENV (parsed) > Default
    macro_rules! get_parsed {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            match $yaml_value {
                Some(value) => value,
                None => parse_env($env_var)?.unwrap_or($default),
            }
        };
    }

    let server = yaml.server.unwrap_or_default();
    let session = yaml.session.unwrap_or_default();
    let vad = yaml.vad.unwrap_or_default();
    let providers = yaml.providers.unwrap_or_default();

    // Server configuration
    let host = get_value!("HOST", server.host, defaults.host);
    let port = get_parsed!("PORT", server.port, defaults.port);
    let public_stream_url = get_optional!("PUBLIC_STREAM_URL", server.public_stream_url);

    // Session configuration
    let greeting = get_value!("GREETING", session.greeting, defaults.greeting);
    let mark_label = get_value!("MARK_LABEL", session.mark_label, defaults.mark_label);
    let playback_chunk_bytes = get_parsed!(
        "PLAYBACK_CHUNK_BYTES",
        session.playback_chunk_bytes,
        defaults.playback_chunk_bytes
    );

    // VAD configuration
    let vad_energy_threshold = get_parsed!(
        "VAD_ENERGY_THRESHOLD",
        vad.energy_threshold,
        defaults.vad_energy_threshold
    );
    let vad_window_ms = get_parsed!("VAD_WINDOW_MS", vad.window_ms, defaults.vad_window_ms);
    let vad_onset_ms = get_parsed!("VAD_ONSET_MS", vad.onset_ms, defaults.vad_onset_ms);
    let vad_silence_ms = get_parsed!("VAD_SILENCE_MS", vad.silence_ms, defaults.vad_silence_ms);
    let vad_padding_ms = get_parsed!("VAD_PADDING_MS", vad.padding_ms, defaults.vad_padding_ms);
    let vad_max_utterance_ms = get_parsed!(
        "VAD_MAX_UTTERANCE_MS",
        vad.max_utterance_ms,
        defaults.vad_max_utterance_ms
    );

    // Provider configuration
    let openai_api_key = get_optional!("OPENAI_API_KEY", providers.openai_api_key);
    let openai_base_url = get_value!(
        "OPENAI_BASE_URL",
        providers.openai_base_url,
        defaults.openai_base_url
    );
    let stt_model = get_value!("STT_MODEL", providers.stt_model, defaults.stt_model);
    let tts_model = get_value!("TTS_MODEL", providers.tts_model, defaults.tts_model);
    let tts_voice = get_value!("TTS_VOICE", providers.tts_voice, defaults.tts_voice);

    Ok(ServerConfig {
        host,
        port,
        public_stream_url,
        greeting,
        mark_label,
        playback_chunk_bytes,
        vad_energy_threshold,
        vad_window_ms,
        vad_onset_ms,
        vad_silence_ms,
        vad_padding_ms,
        vad_max_utterance_ms,
        openai_api_key,
        openai_base_url,
        stt_model,
        tts_model,
        tts_voice,
    })
}
