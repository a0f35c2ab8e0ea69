pub mod audio;
pub mod codec;
pub mod protocol;
pub mod providers;
pub mod responder;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod stt;
pub mod tts;
pub mod utterance;
pub mod vad;

// Re-export commonly used types for convenience
pub use protocol::{FrameError, InboundFrame, OutboundFrame};
pub use responder::{ParrotResponder, Responder};
pub use sequencer::{FrameSink, OutboundSequencer, SinkError};
pub use session::{Session, SessionConfig, SessionError, SessionState};
pub use stt::{OpenAITranscriber, Transcriber, TranscriptionError};
pub use tts::{OpenAISynthesizer, SynthesisError, Synthesizer};
pub use utterance::UtteranceBuffer;
pub use vad::VADConfig;

// Re-export CoreState for external use
pub use state::CoreState;
