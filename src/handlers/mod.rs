//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `voice` - Inbound call webhook returning TwiML
//! - `stream` - Media stream WebSocket driving one session per call

pub mod api;
pub mod stream;
pub mod voice;

pub use stream::stream_handler;
