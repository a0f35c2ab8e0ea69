//! Onset/offset tracking over per-window signal energy.
//!
//! This module provides the `SilenceTracker` component that consumes one RMS
//! estimate per analysis window and decides when an utterance has started and
//! when it has finished. It records where, in sample offsets, the speech
//! region begins and ends so the owning buffer can crop it.
//!
//! # State Transitions
//!
//! ```text
//! [Idle] ─── speech for >= onset_ms ──► [Speaking] (SpeechStart)
//!   │
//!   └── speech shorter than onset_ms, then silence ──► [Idle] (debounced)
//!
//! [Speaking] ─── first silent window ──► [Pausing] (SilenceDetected)
//!
//! [Pausing] ─── speech ──► [Speaking] (SpeechResumed)
//!           ─── silence for >= silence_ms ──► [Finished] (TurnEnd)
//!
//! [Speaking/Pausing] ─── max_utterance_ms since onset ──► [Finished] (TurnEnd)
//!
//! [Finished] is terminal; further windows are ignored.
//! ```

use tracing::debug;

use super::config::VADConfig;

/// Event emitted by the silence tracker during state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VADEvent {
    /// Sustained speech crossed the onset duration.
    SpeechStart,

    /// Speech went quiet; the pause has not yet reached the silence duration.
    SilenceDetected,

    /// Speech resumed before the pause became a turn end.
    SpeechResumed,

    /// Silence after onset reached the configured duration.
    TurnEnd,
}

/// Tracks speech and silence runs for a single utterance.
///
/// The tracker is owned by exactly one utterance buffer and is never reset;
/// a new utterance gets a new tracker.
#[derive(Debug)]
pub struct SilenceTracker {
    config: VADConfig,

    started: bool,
    finished: bool,

    /// Continuous speech observed in the current run (ms).
    speech_run_ms: u64,

    /// Continuous silence observed since the last speech window (ms).
    silence_run_ms: u64,

    /// Audio covered since onset (ms).
    utterance_ms: u64,

    /// Sample offset where the current speech run began.
    run_start: usize,

    /// Sample offset where the current silence run began.
    silence_start: usize,

    onset: Option<usize>,
    offset: Option<usize>,
}

impl SilenceTracker {
    /// Create a new silence tracker with the given configuration.
    pub fn new(config: VADConfig) -> Self {
        Self {
            config,
            started: false,
            finished: false,
            speech_run_ms: 0,
            silence_run_ms: 0,
            utterance_ms: 0,
            run_start: 0,
            silence_start: 0,
            onset: None,
            offset: None,
        }
    }

    /// Process the energy of one analysis window and return any triggered event.
    ///
    /// # Arguments
    /// * `energy` - RMS energy of the window
    /// * `window_start` - Sample offset of the window's first sample
    pub fn process(&mut self, energy: f32, window_start: usize) -> Option<VADEvent> {
        if self.finished {
            return None;
        }

        let was_started = self.started;
        let event = if energy > self.config.energy_threshold {
            self.process_speech_window(window_start)
        } else {
            self.process_silence_window(window_start)
        };

        if was_started && !self.finished {
            self.utterance_ms += self.config.window_ms;
            if self.utterance_ms >= self.config.max_utterance_ms {
                return Some(self.force_turn_end(window_start));
            }
        }
        event
    }

    /// Finish an utterance that reached the length cap.
    fn force_turn_end(&mut self, window_start: usize) -> VADEvent {
        let offset = if self.silence_run_ms > 0 {
            self.silence_start
        } else {
            window_start + self.config.window_samples()
        };
        self.finished = true;
        self.offset = Some(offset);
        debug!(
            "VAD: Turn end after {}ms utterance cap (speech ended at sample {})",
            self.utterance_ms, offset
        );
        VADEvent::TurnEnd
    }

    fn process_speech_window(&mut self, window_start: usize) -> Option<VADEvent> {
        if self.speech_run_ms == 0 {
            self.run_start = window_start;
        }
        self.speech_run_ms += self.config.window_ms;
        let silence_before = std::mem::take(&mut self.silence_run_ms);

        if !self.started {
            if self.speech_run_ms >= self.config.onset_ms {
                self.started = true;
                self.onset = Some(self.run_start);
                self.utterance_ms = self.speech_run_ms;
                debug!(
                    "VAD: Speech started at sample {} after {}ms of speech",
                    self.run_start, self.speech_run_ms
                );
                return Some(VADEvent::SpeechStart);
            }
            return None;
        }

        if silence_before > 0 {
            debug!("VAD: Speech resumed after {}ms silence", silence_before);
            return Some(VADEvent::SpeechResumed);
        }
        None
    }

    fn process_silence_window(&mut self, window_start: usize) -> Option<VADEvent> {
        if !self.started {
            if self.speech_run_ms > 0 {
                debug!(
                    "VAD: Ignoring {}ms burst shorter than onset ({}ms)",
                    self.speech_run_ms, self.config.onset_ms
                );
            }
            self.speech_run_ms = 0;
            return None;
        }

        let first_silent_window = self.silence_run_ms == 0;
        if first_silent_window {
            self.silence_start = window_start;
        }
        self.silence_run_ms += self.config.window_ms;

        if self.silence_run_ms >= self.config.silence_ms {
            self.finished = true;
            self.offset = Some(self.silence_start);
            debug!(
                "VAD: Turn end after {}ms silence (speech ended at sample {})",
                self.silence_run_ms, self.silence_start
            );
            return Some(VADEvent::TurnEnd);
        }

        if first_silent_window {
            return Some(VADEvent::SilenceDetected);
        }
        None
    }

    /// Whether onset has fired.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether offset has fired. Implies [`is_started`](Self::is_started).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether a speech run is in progress or an utterance has begun.
    ///
    /// While this is false the tracker holds no sample offsets, so the owner
    /// may discard analyzed audio freely.
    pub fn has_speech(&self) -> bool {
        self.started || self.speech_run_ms > 0
    }

    /// Sample offset of the first speech window, once started.
    pub fn onset_sample(&self) -> Option<usize> {
        self.onset
    }

    /// Sample offset of the first trailing silence window, once finished.
    pub fn offset_sample(&self) -> Option<usize> {
        self.offset
    }

    /// Get current silence run in milliseconds.
    pub fn current_silence_ms(&self) -> u64 {
        self.silence_run_ms
    }

    /// Get current speech run in milliseconds.
    pub fn current_speech_ms(&self) -> u64 {
        self.speech_run_ms
    }

    /// Get audio covered since onset in milliseconds.
    pub fn current_utterance_ms(&self) -> u64 {
        self.utterance_ms
    }

    /// Get the current configuration.
    pub fn config(&self) -> &VADConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOUD: f32 = 2000.0;
    const QUIET: f32 = 50.0;
    const WINDOW: usize = 160;

    fn tracker(onset_ms: u64, silence_ms: u64) -> SilenceTracker {
        SilenceTracker::new(
            VADConfig::default()
                .with_onset_ms(onset_ms)
                .with_silence_ms(silence_ms),
        )
    }

    /// Feed energies as consecutive windows, returning every event.
    fn feed(tracker: &mut SilenceTracker, start_window: usize, energies: &[f32]) -> Vec<VADEvent> {
        energies
            .iter()
            .enumerate()
            .filter_map(|(i, &e)| tracker.process(e, (start_window + i) * WINDOW))
            .collect()
    }

    #[test]
    fn test_no_speech_no_events() {
        let mut tracker = tracker(60, 100);
        assert!(feed(&mut tracker, 0, &[QUIET; 20]).is_empty());
        assert!(!tracker.is_started());
        assert!(!tracker.has_speech());
    }

    #[test]
    fn test_speech_start_requires_onset_duration() {
        let mut tracker = tracker(60, 100);
        assert_eq!(tracker.process(LOUD, 0), None);
        assert_eq!(tracker.process(LOUD, 160), None);
        assert_eq!(tracker.process(LOUD, 320), Some(VADEvent::SpeechStart));
        assert!(tracker.is_started());
        assert_eq!(tracker.onset_sample(), Some(0));
    }

    #[test]
    fn test_short_burst_is_debounced() {
        let mut tracker = tracker(60, 100);
        let events = feed(&mut tracker, 0, &[LOUD, LOUD, QUIET, LOUD, LOUD, QUIET]);
        assert!(events.is_empty());
        assert!(!tracker.is_started());
        assert!(!tracker.has_speech());
    }

    #[test]
    fn test_onset_marks_start_of_sustained_run() {
        let mut tracker = tracker(60, 100);
        let events = feed(&mut tracker, 0, &[QUIET, LOUD, QUIET, LOUD, LOUD, LOUD]);
        assert_eq!(events, vec![VADEvent::SpeechStart]);
        assert_eq!(tracker.onset_sample(), Some(3 * WINDOW));
    }

    #[test]
    fn test_turn_end_after_silence_duration() {
        let mut tracker = tracker(40, 60);
        let events = feed(&mut tracker, 0, &[LOUD, LOUD, QUIET, QUIET, QUIET]);
        assert_eq!(
            events,
            vec![
                VADEvent::SpeechStart,
                VADEvent::SilenceDetected,
                VADEvent::TurnEnd
            ]
        );
        assert!(tracker.is_finished());
        assert_eq!(tracker.offset_sample(), Some(2 * WINDOW));
    }

    #[test]
    fn test_speech_resumed_restarts_silence_count() {
        let mut tracker = tracker(40, 60);
        let events = feed(
            &mut tracker,
            0,
            &[LOUD, LOUD, QUIET, QUIET, LOUD, QUIET, QUIET, QUIET],
        );
        assert_eq!(
            events,
            vec![
                VADEvent::SpeechStart,
                VADEvent::SilenceDetected,
                VADEvent::SpeechResumed,
                VADEvent::SilenceDetected,
                VADEvent::TurnEnd
            ]
        );
        assert_eq!(tracker.offset_sample(), Some(5 * WINDOW));
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut tracker = tracker(20, 20);
        assert_eq!(tracker.process(LOUD, 0), Some(VADEvent::SpeechStart));
        assert_eq!(tracker.process(QUIET, 160), Some(VADEvent::TurnEnd));
        assert!(feed(&mut tracker, 2, &[LOUD, LOUD, QUIET, QUIET]).is_empty());
        assert_eq!(tracker.offset_sample(), Some(160));
    }

    #[test]
    fn test_finished_implies_started() {
        let mut tracker = tracker(60, 100);
        let pattern = [QUIET, LOUD, QUIET, LOUD, LOUD, LOUD, QUIET, QUIET, QUIET, QUIET, QUIET];
        for (i, &energy) in pattern.iter().enumerate() {
            tracker.process(energy, i * WINDOW);
            assert!(!tracker.is_finished() || tracker.is_started());
        }
        assert!(tracker.is_finished());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut tracker = tracker(20, 100);
        assert_eq!(tracker.process(500.0, 0), None);
        assert_eq!(tracker.process(500.1, 160), Some(VADEvent::SpeechStart));
    }

    #[test]
    fn test_endless_speech_is_capped() {
        let mut tracker = SilenceTracker::new(
            VADConfig::default()
                .with_onset_ms(40)
                .with_silence_ms(100)
                .with_max_utterance_ms(100),
        );
        let events = feed(&mut tracker, 0, &[LOUD; 10]);
        assert_eq!(events, vec![VADEvent::SpeechStart, VADEvent::TurnEnd]);
        assert!(tracker.is_finished());
        assert_eq!(tracker.onset_sample(), Some(0));
        // Five windows of speech: two for onset, three more to reach the cap.
        assert_eq!(tracker.offset_sample(), Some(5 * WINDOW));
        assert_eq!(tracker.current_utterance_ms(), 100);
    }

    #[test]
    fn test_cap_during_pause_ends_at_the_pause() {
        let mut tracker = SilenceTracker::new(
            VADConfig::default()
                .with_onset_ms(40)
                .with_silence_ms(200)
                .with_max_utterance_ms(100),
        );
        let events = feed(&mut tracker, 0, &[LOUD, LOUD, LOUD, QUIET, QUIET]);
        assert_eq!(
            events,
            vec![
                VADEvent::SpeechStart,
                VADEvent::SilenceDetected,
                VADEvent::TurnEnd
            ]
        );
        assert_eq!(tracker.offset_sample(), Some(3 * WINDOW));
    }

    #[test]
    fn test_cap_counts_from_onset_not_leading_silence() {
        let mut tracker = SilenceTracker::new(
            VADConfig::default()
                .with_onset_ms(40)
                .with_max_utterance_ms(100),
        );
        assert!(feed(&mut tracker, 0, &[QUIET; 50]).is_empty());
        let events = feed(&mut tracker, 50, &[LOUD; 4]);
        assert_eq!(events, vec![VADEvent::SpeechStart]);
        assert_eq!(tracker.current_utterance_ms(), 80);
        assert!(!tracker.is_finished());
    }

    #[test]
    fn test_getters() {
        let mut tracker = tracker(40, 200);
        feed(&mut tracker, 0, &[LOUD, LOUD, LOUD, QUIET, QUIET]);
        assert_eq!(tracker.current_speech_ms(), 60);
        assert_eq!(tracker.current_silence_ms(), 40);
        assert_eq!(tracker.config().silence_ms, 200);
    }
}
