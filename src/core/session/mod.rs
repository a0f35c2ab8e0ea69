//! # Session
//!
//! The per-call protocol state machine. A [`Session`] owns the caller's
//! current [`UtteranceBuffer`](crate::core::utterance::UtteranceBuffer) and an
//! [`OutboundSequencer`](crate::core::sequencer::OutboundSequencer), consumes
//! inbound media stream frames in order, and runs the
//! transcribe → respond → synthesize → play cycle for each finished utterance.

pub mod config;
pub mod errors;
pub mod machine;
pub mod state;


// Re-export commonly used items
pub use config::{DEFAULT_GREETING, DEFAULT_MARK_LABEL, SessionConfig};
pub use errors::{SessionError, SessionResult};
pub use machine::Session;
pub use state::{CallIdentity, SessionState};
