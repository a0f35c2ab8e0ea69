//! Accumulation and segmentation of one caller utterance.
//!
//! An [`UtteranceBuffer`] collects decoded PCM for a single utterance and runs
//! energy VAD over it one analysis window at a time. Once onset and offset
//! have both fired, [`UtteranceBuffer::crop`] hands back just the speech
//! region (plus padding) and the buffer is gone; the owner replaces it with a
//! fresh one.

use thiserror::Error;
use tracing::{debug, trace};

use super::codec;
use super::vad::{SilenceTracker, VADConfig, VADEvent, rms};

/// Errors raised by utterance buffer operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtteranceError {
    #[error("cannot crop an utterance that has not finished")]
    NotFinished,
}

/// Leading silence kept beyond the crop padding before the buffer compacts.
const COMPACT_SLACK_SAMPLES: usize = codec::SAMPLE_RATE as usize;

/// PCM accumulator with onset/offset detection for a single utterance.
#[derive(Debug)]
pub struct UtteranceBuffer {
    samples: Vec<i16>,
    /// Samples already fed through the tracker. Always a window multiple.
    analyzed: usize,
    window: usize,
    padding: usize,
    tracker: SilenceTracker,
}

impl UtteranceBuffer {
    pub fn new(config: VADConfig) -> Self {
        Self {
            samples: Vec::new(),
            analyzed: 0,
            window: config.window_samples(),
            padding: config.padding_samples(),
            tracker: SilenceTracker::new(config),
        }
    }

    /// Append decoded samples and advance detection over every complete window.
    ///
    /// Samples arriving after the utterance finished are kept only as far as
    /// the trailing crop padding reaches. Speech that never pauses is
    /// finished once it reaches the configured length cap.
    pub fn append(&mut self, samples: &[i16]) {
        if let Some(limit) = self.retain_limit() {
            let room = limit.saturating_sub(self.samples.len());
            self.samples
                .extend_from_slice(&samples[..room.min(samples.len())]);
            return;
        }

        self.samples.extend_from_slice(samples);
        self.analyze();

        if let Some(limit) = self.retain_limit() {
            self.samples.truncate(limit);
        } else if !self.tracker.has_speech() {
            self.compact();
        }
    }

    fn analyze(&mut self) {
        while !self.tracker.is_finished() && self.analyzed + self.window <= self.samples.len() {
            let start = self.analyzed;
            let energy = rms(&self.samples[start..start + self.window]);
            self.analyzed += self.window;

            match self.tracker.process(energy, start) {
                Some(VADEvent::SpeechStart) => {
                    debug!(onset = start, energy, "Utterance onset");
                }
                Some(VADEvent::TurnEnd) => {
                    debug!(
                        duration_ms = codec::samples_to_ms(self.speech_len()),
                        "Utterance finished"
                    );
                }
                Some(event) => trace!(?event, "VAD event"),
                None => {}
            }
        }
    }

    /// Drop leading silence that can no longer end up inside a crop.
    fn compact(&mut self) {
        let excess = self.analyzed.saturating_sub(self.padding);
        if excess >= COMPACT_SLACK_SAMPLES {
            self.samples.drain(..excess);
            self.analyzed -= excess;
            trace!(dropped = excess, "Compacted leading silence");
        }
    }

    fn retain_limit(&self) -> Option<usize> {
        self.tracker
            .offset_sample()
            .map(|offset| offset + self.padding)
    }

    fn speech_len(&self) -> usize {
        match (self.tracker.onset_sample(), self.tracker.offset_sample()) {
            (Some(onset), Some(offset)) => offset - onset,
            _ => 0,
        }
    }

    pub fn has_started(&self) -> bool {
        self.tracker.is_started()
    }

    pub fn has_finished(&self) -> bool {
        self.tracker.is_finished()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consume the buffer, returning the padded speech region.
    ///
    /// Fails with [`UtteranceError::NotFinished`] if offset has not fired.
    pub fn crop(mut self) -> Result<Vec<i16>, UtteranceError> {
        let (onset, offset) = match (self.tracker.onset_sample(), self.tracker.offset_sample()) {
            (Some(onset), Some(offset)) => (onset, offset),
            _ => return Err(UtteranceError::NotFinished),
        };

        let end = (offset + self.padding).min(self.samples.len());
        let start = onset.saturating_sub(self.padding).min(end);
        self.samples.truncate(end);
        self.samples.drain(..start);
        Ok(self.samples)
    }
}
