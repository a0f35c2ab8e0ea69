//! Session lifecycle state

use std::fmt;

/// Where a call is in its lifecycle.
///
/// ```text
/// AwaitingStart ──start──► Listening ⇄ Speaking ──stop──► Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No start frame yet; nothing is processed except `start`.
    AwaitingStart,
    /// Caller audio is segmented and finished utterances are answered.
    Listening,
    /// Agent audio is outstanding. Caller audio is still buffered so barge-in
    /// is detected, but no new respond cycle begins.
    Speaking,
    /// Stream stopped or transport gone. Terminal.
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::AwaitingStart => write!(f, "awaiting_start"),
            SessionState::Listening => write!(f, "listening"),
            SessionState::Speaking => write!(f, "speaking"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Identities fixed by the start frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallIdentity {
    pub caller_id: String,
    pub stream_id: String,
}
