use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::responder::{ParrotResponder, Responder};
use crate::core::stt::{OpenAITranscriber, Transcriber};
use crate::core::tts::{OpenAISynthesizer, Synthesizer};

/// Core-specific shared state for the application.
///
/// Holds the speech capabilities every session calls out to. The capabilities
/// are stateless per request, so one instance serves all calls.
#[derive(Clone)]
pub struct CoreState {
    pub transcriber: Arc<dyn Transcriber>,
    pub responder: Arc<dyn Responder>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl CoreState {
    /// Wire the default providers from server configuration.
    pub fn new(config: &ServerConfig) -> Arc<Self> {
        let openai = config.openai_config();
        if openai.api_key().is_none() {
            warn!("OPENAI_API_KEY is not set; transcription and synthesis will fail");
        }

        info!(
            "Initialized speech providers: stt={}, tts={} (voice {}), base_url={}",
            config.stt_model, config.tts_model, config.tts_voice, openai.base_url
        );

        Self::from_parts(
            Arc::new(OpenAITranscriber::new(openai.clone(), &config.stt_model)),
            Arc::new(ParrotResponder),
            Arc::new(OpenAISynthesizer::new(
                openai,
                &config.tts_model,
                &config.tts_voice,
            )),
        )
    }

    /// Build from explicit capability implementations.
    pub fn from_parts(
        transcriber: Arc<dyn Transcriber>,
        responder: Arc<dyn Responder>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            transcriber,
            responder,
            synthesizer,
        })
    }
}
