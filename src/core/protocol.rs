//! Media stream wire protocol.
//!
//! Every frame is a JSON object discriminated by its `event` field. Inbound
//! frames come from the telephony leg; outbound frames carry playback audio,
//! playback marks and clear requests back to it.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Wire encoding the session expects on both directions.
pub const EXPECTED_ENCODING: &str = "audio/x-mulaw";

/// Transport-level frame errors. Frames failing with these are dropped.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid media payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("empty media payload")]
    EmptyPayload,
}

/// Frames received from the telephony leg.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum InboundFrame {
    Connected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol: Option<String>,
    },
    Start {
        #[serde(rename = "streamSid", default)]
        stream_sid: Option<String>,
        start: StartPayload,
    },
    Media {
        #[serde(rename = "streamSid", default)]
        stream_sid: Option<String>,
        media: MediaPayload,
    },
    Mark {
        #[serde(rename = "streamSid", default)]
        stream_sid: Option<String>,
        mark: MarkPayload,
    },
    Stop {
        #[serde(rename = "streamSid", default)]
        stream_sid: Option<String>,
    },
}

impl InboundFrame {
    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Event name, for logging.
    pub fn event(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Start { .. } => "start",
            Self::Media { .. } => "media",
            Self::Mark { .. } => "mark",
            Self::Stop { .. } => "stop",
        }
    }
}

/// Payload of a `start` frame.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_format: Option<MediaFormat>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_parameters: HashMap<String, String>,
}

impl StartPayload {
    /// Caller identity: the `caller` custom parameter, else the call id.
    pub fn caller_id(&self) -> String {
        self.custom_parameters
            .get("caller")
            .or(self.call_sid.as_ref())
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaFormat {
    pub encoding: String,
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_channels() -> u16 {
    1
}

impl MediaFormat {
    /// Whether this is 8 kHz mono µ-law.
    pub fn is_expected(&self) -> bool {
        self.encoding == EXPECTED_ENCODING
            && self.sample_rate == crate::core::codec::SAMPLE_RATE
            && self.channels == 1
    }
}

/// Payload of a `media` frame.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MediaPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    /// Sequence number of the chunk, sent as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub payload: String,
}

impl MediaPayload {
    pub fn is_outbound(&self) -> bool {
        self.track.as_deref() == Some("outbound")
    }

    pub fn chunk_number(&self) -> Option<u64> {
        self.chunk.as_deref().and_then(|c| c.parse().ok())
    }

    /// Decode the base64 payload into wire bytes.
    pub fn decode_audio(&self) -> Result<Vec<u8>, FrameError> {
        let bytes = BASE64.decode(self.payload.trim())?;
        if bytes.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        Ok(bytes)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MarkPayload {
    pub name: String,
}

/// Frames sent to the telephony leg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum OutboundFrame {
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: OutboundMedia,
    },
    Mark {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        mark: MarkPayload,
    },
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundMedia {
    pub payload: String,
}

impl OutboundFrame {
    /// Playback frame carrying one chunk of wire audio.
    pub fn media(stream_sid: &str, audio: &[u8]) -> Self {
        Self::Media {
            stream_sid: stream_sid.to_string(),
            media: OutboundMedia {
                payload: BASE64.encode(audio),
            },
        }
    }

    pub fn mark(stream_sid: &str, label: &str) -> Self {
        Self::Mark {
            stream_sid: stream_sid.to_string(),
            mark: MarkPayload {
                name: label.to_string(),
            },
        }
    }

    pub fn clear(stream_sid: &str) -> Self {
        Self::Clear {
            stream_sid: stream_sid.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}
