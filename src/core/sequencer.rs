//! Outbound framing and mark-gated flow control.
//!
//! The sequencer turns encoded playback audio into media frames, follows each
//! batch with a single playback mark, and issues clear frames on barge-in. It
//! tracks the one outstanding mark so the session knows when everything it
//! queued has actually been played.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::codec::FRAME_SAMPLES;
use super::protocol::{FrameError, OutboundFrame};

/// Default playback chunk: one second of wire audio.
pub const DEFAULT_CHUNK_BYTES: usize = 8000;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("transport closed")]
    Closed,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] FrameError),

    #[error("mark '{0}' is still outstanding")]
    MarkOutstanding(String),
}

/// Transport capability accepting serialized outbound frames, in order.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send_frame(&self, frame: String) -> Result<(), SinkError>;
}

/// How an inbound mark relates to the outstanding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The outstanding mark was acknowledged and cleared.
    Matched,
    /// A mark is outstanding but the label differs; it stays outstanding.
    Mismatched,
    /// No mark was outstanding.
    Unexpected,
}

pub struct OutboundSequencer {
    sink: Arc<dyn FrameSink>,
    chunk_bytes: usize,
    outstanding: Option<String>,
}

impl OutboundSequencer {
    /// `chunk_bytes` is rounded down to whole codec frames, minimum one frame.
    pub fn new(sink: Arc<dyn FrameSink>, chunk_bytes: usize) -> Self {
        let chunk_bytes = (chunk_bytes / FRAME_SAMPLES).max(1) * FRAME_SAMPLES;
        Self {
            sink,
            chunk_bytes,
            outstanding: None,
        }
    }

    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    async fn send(&self, frame: OutboundFrame) -> Result<(), SinkError> {
        self.sink.send_frame(frame.to_json()?).await
    }

    /// Send encoded audio as one or more media frames.
    ///
    /// Returns the number of frames sent.
    pub async fn emit_playback(&self, stream_id: &str, audio: &[u8]) -> Result<usize, SinkError> {
        let mut sent = 0;
        for chunk in audio.chunks(self.chunk_bytes) {
            self.send(OutboundFrame::media(stream_id, chunk)).await?;
            sent += 1;
        }
        debug!(stream_id, bytes = audio.len(), frames = sent, "Queued playback");
        Ok(sent)
    }

    /// Send a playback mark and record it as outstanding.
    ///
    /// Only one mark may be outstanding at a time.
    pub async fn emit_ack(&mut self, stream_id: &str, label: &str) -> Result<(), SinkError> {
        if let Some(pending) = &self.outstanding {
            return Err(SinkError::MarkOutstanding(pending.clone()));
        }
        self.send(OutboundFrame::mark(stream_id, label)).await?;
        self.outstanding = Some(label.to_string());
        debug!(stream_id, label, "Requested playback mark");
        Ok(())
    }

    /// Ask the remote leg to drop any queued playback.
    pub async fn emit_interrupt(&self, stream_id: &str) -> Result<(), SinkError> {
        self.send(OutboundFrame::clear(stream_id)).await?;
        debug!(stream_id, "Sent clear");
        Ok(())
    }

    /// Correlate an inbound mark with the outstanding request.
    pub fn acknowledge(&mut self, label: &str) -> AckOutcome {
        match self.outstanding.as_deref() {
            Some(pending) if pending == label => {
                self.outstanding = None;
                AckOutcome::Matched
            }
            Some(pending) => {
                warn!(expected = pending, received = label, "Mark label mismatch");
                AckOutcome::Mismatched
            }
            None => AckOutcome::Unexpected,
        }
    }

    pub fn has_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }
}
