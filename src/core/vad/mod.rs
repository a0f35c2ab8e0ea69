//! Energy-based voice activity detection.
//!
//! Telephone audio is analyzed in fixed windows; each window's RMS energy is
//! fed to a [`SilenceTracker`] which decides utterance onset and offset.

pub mod config;
pub mod energy;
pub mod silence_tracker;

pub use config::VADConfig;
pub use energy::rms;
pub use silence_tracker::{SilenceTracker, VADEvent};
