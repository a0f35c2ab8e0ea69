use super::ServerConfig;
use crate::core::codec::FRAME_SAMPLES;

/// Validate a merged configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_vad(config)?;
    validate_session(config)?;
    validate_public_stream_url(&config.public_stream_url)?;
    Ok(())
}

/// Validate VAD tuning
///
/// Ensures the analysis window is non-empty, that onset and silence durations
/// cover at least one window, that the utterance cap outlasts onset, and that
/// the energy threshold is usable.
pub fn validate_vad(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.vad_window_ms == 0 {
        return Err("VAD_WINDOW_MS must be greater than 0".into());
    }
    if config.vad_onset_ms < config.vad_window_ms {
        return Err(format!(
            "VAD_ONSET_MS ({}) must be at least one window ({}ms)",
            config.vad_onset_ms, config.vad_window_ms
        )
        .into());
    }
    if config.vad_silence_ms < config.vad_window_ms {
        return Err(format!(
            "VAD_SILENCE_MS ({}) must be at least one window ({}ms)",
            config.vad_silence_ms, config.vad_window_ms
        )
        .into());
    }
    if config.vad_max_utterance_ms <= config.vad_onset_ms {
        return Err(format!(
            "VAD_MAX_UTTERANCE_MS ({}) must be longer than VAD_ONSET_MS ({})",
            config.vad_max_utterance_ms, config.vad_onset_ms
        )
        .into());
    }
    if !config.vad_energy_threshold.is_finite() || config.vad_energy_threshold <= 0.0 {
        return Err(format!(
            "VAD_ENERGY_THRESHOLD must be a positive number, got {}",
            config.vad_energy_threshold
        )
        .into());
    }
    Ok(())
}

/// Validate per-call session settings
pub fn validate_session(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.playback_chunk_bytes < FRAME_SAMPLES {
        return Err(format!(
            "PLAYBACK_CHUNK_BYTES ({}) must be at least one codec frame ({FRAME_SAMPLES} bytes)",
            config.playback_chunk_bytes
        )
        .into());
    }
    if config.mark_label.trim().is_empty() {
        return Err("MARK_LABEL cannot be empty".into());
    }
    Ok(())
}

/// Validate the advertised media stream URL, if set
pub fn validate_public_stream_url(url: &Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(url) = url
        && !(url.starts_with("ws://") || url.starts_with("wss://"))
    {
        return Err(format!("PUBLIC_STREAM_URL must start with ws:// or wss://, got {url}").into());
    }
    Ok(())
}
