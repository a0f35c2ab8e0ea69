//! Per-call session settings

use crate::core::sequencer::DEFAULT_CHUNK_BYTES;
use crate::core::vad::VADConfig;

/// Spoken as soon as the stream starts.
pub const DEFAULT_GREETING: &str = "Hey! How can I help you?";

/// Label attached to every playback mark.
pub const DEFAULT_MARK_LABEL: &str = "ack";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub greeting: String,
    pub mark_label: String,
    /// Upper bound on wire bytes per outbound media frame.
    pub playback_chunk_bytes: usize,
    pub vad: VADConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            mark_label: DEFAULT_MARK_LABEL.to_string(),
            playback_chunk_bytes: DEFAULT_CHUNK_BYTES,
            vad: VADConfig::default(),
        }
    }
}
