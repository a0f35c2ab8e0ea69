//! Provider infrastructure for external speech services.
//!
//! Shared connection settings and HTTP plumbing for the cloud APIs backing the
//! transcription and synthesis capabilities.
//!
//! # Available Providers
//!
//! - **openai**: OpenAI-compatible REST API (`/audio/transcriptions`, `/audio/speech`)

pub mod openai;

pub use openai::{DEFAULT_OPENAI_BASE_URL, OpenAIConfig};
