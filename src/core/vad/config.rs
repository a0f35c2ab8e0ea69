//! Configuration for energy-based voice activity detection.
//!
//! Utterance segmentation runs on a short-window RMS energy estimate. The
//! defaults below are empirically tuned for 8 kHz telephone audio, where line
//! noise typically sits well under an RMS of 200 and conversational speech
//! well above 1000.

use crate::core::codec;

/// Default RMS energy (i16 scale) above which a window counts as speech.
pub const DEFAULT_ENERGY_THRESHOLD: f32 = 500.0;
/// Default analysis window length, one media frame.
pub const DEFAULT_WINDOW_MS: u64 = 20;
/// Default sustained speech required before onset fires.
pub const DEFAULT_ONSET_MS: u64 = 60;
/// Default trailing silence required before an utterance is finished.
pub const DEFAULT_SILENCE_MS: u64 = 800;
/// Default audio kept on each side of the detected speech region.
pub const DEFAULT_PADDING_MS: u64 = 100;
/// Default longest utterance before it is finished without a pause.
pub const DEFAULT_MAX_UTTERANCE_MS: u64 = 30_000;

/// Parameters controlling onset/offset detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VADConfig {
    /// RMS energy threshold (0.0 to 32768.0).
    ///
    /// Windows with RMS strictly above this value are treated as speech.
    pub energy_threshold: f32,

    /// Length of one energy analysis window (ms).
    pub window_ms: u64,

    /// Minimum continuous speech before the utterance counts as started (ms).
    ///
    /// Debounces clicks and short noise bursts.
    pub onset_ms: u64,

    /// Continuous silence after onset that finishes the utterance (ms).
    pub silence_ms: u64,

    /// Audio retained before onset and after offset when cropping (ms).
    pub padding_ms: u64,

    /// Longest utterance, measured from onset, before it is finished without
    /// waiting for silence (ms).
    ///
    /// Bounds the buffer when the line never goes quiet.
    pub max_utterance_ms: u64,
}

impl Default for VADConfig {
    fn default() -> Self {
        Self {
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            window_ms: DEFAULT_WINDOW_MS,
            onset_ms: DEFAULT_ONSET_MS,
            silence_ms: DEFAULT_SILENCE_MS,
            padding_ms: DEFAULT_PADDING_MS,
            max_utterance_ms: DEFAULT_MAX_UTTERANCE_MS,
        }
    }
}

impl VADConfig {
    /// Create a new config with the specified energy threshold.
    pub fn with_energy_threshold(mut self, threshold: f32) -> Self {
        self.energy_threshold = threshold;
        self
    }

    /// Create a new config with the specified onset duration.
    pub fn with_onset_ms(mut self, onset_ms: u64) -> Self {
        self.onset_ms = onset_ms;
        self
    }

    /// Create a new config with the specified silence duration.
    pub fn with_silence_ms(mut self, silence_ms: u64) -> Self {
        self.silence_ms = silence_ms;
        self
    }

    /// Create a new config with the specified crop padding.
    pub fn with_padding_ms(mut self, padding_ms: u64) -> Self {
        self.padding_ms = padding_ms;
        self
    }

    /// Create a new config with the specified utterance length cap.
    pub fn with_max_utterance_ms(mut self, max_utterance_ms: u64) -> Self {
        self.max_utterance_ms = max_utterance_ms;
        self
    }

    /// Samples in one analysis window (at least one).
    pub fn window_samples(&self) -> usize {
        codec::ms_to_samples(self.window_ms).max(1)
    }

    /// Samples of padding applied to each side of a crop.
    pub fn padding_samples(&self) -> usize {
        codec::ms_to_samples(self.padding_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VADConfig::default();
        assert_eq!(config.energy_threshold, 500.0);
        assert_eq!(config.window_ms, 20);
        assert_eq!(config.onset_ms, 60);
        assert_eq!(config.silence_ms, 800);
        assert_eq!(config.padding_ms, 100);
        assert_eq!(config.max_utterance_ms, 30_000);
        assert_eq!(config.window_samples(), 160);
        assert_eq!(config.padding_samples(), 800);
    }

    #[test]
    fn test_config_builder_methods() {
        let config = VADConfig::default()
            .with_energy_threshold(900.0)
            .with_onset_ms(40)
            .with_silence_ms(400)
            .with_padding_ms(0)
            .with_max_utterance_ms(5_000);

        assert_eq!(config.energy_threshold, 900.0);
        assert_eq!(config.onset_ms, 40);
        assert_eq!(config.silence_ms, 400);
        assert_eq!(config.padding_samples(), 0);
        assert_eq!(config.max_utterance_ms, 5_000);
    }

    #[test]
    fn test_window_samples_never_zero() {
        let config = VADConfig {
            window_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.window_samples(), 1);
    }
}
