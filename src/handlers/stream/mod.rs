//! # Media Stream WebSocket Module
//!
//! Bridges one telephony media stream connection to one [`Session`].
//!
//! ## Connection Flow
//! 1. The provider connects to `/stream` after the call webhook returned TwiML
//! 2. It sends `connected`, then `start` carrying the stream and caller identity
//! 3. Caller audio arrives as `media` frames (base64 mu-law, 20 ms each)
//! 4. The server answers with `media`, `mark` and `clear` frames
//! 5. A `stop` frame or a disconnect ends the session
//!
//! Text frames are parsed on the reader loop and handed to the session over a
//! channel in arrival order. Outbound frames travel through a [`ChannelSink`]
//! to a dedicated sender task.
//!
//! [`Session`]: crate::core::session::Session

pub mod handler;
pub mod sink;

pub use handler::stream_handler;
pub use sink::ChannelSink;
