//! Shared fakes and helpers for the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use phonestream::core::codec;
use phonestream::core::responder::ParrotResponder;
use phonestream::core::state::CoreState;
use phonestream::core::stt::{Transcriber, TranscriptionError};
use phonestream::core::tts::{SynthesisError, Synthesizer};
use phonestream::{ServerConfig, routes, state::AppState};

pub const STREAM_SID: &str = "MZ00000000000000000000000000000000";

/// Returns scripted transcripts in order, then "hello".
#[derive(Default)]
pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedTranscriber {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            script: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _audio: &[i16]) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| "hello".to_string()))
    }
}

/// Synthesizes a fixed-length tone and records every text it was asked to say.
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub texts: Mutex<Vec<String>>,
    /// Everything after the greeting never completes.
    hold_replies: bool,
}

impl RecordingSynthesizer {
    pub fn holding_replies() -> Self {
        Self {
            hold_replies: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().len()
    }
}

#[async_trait]
impl Synthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<i16>, SynthesisError> {
        let call = {
            let mut texts = self.texts.lock();
            texts.push(text.to_string());
            texts.len()
        };
        if self.hold_replies && call > 1 {
            std::future::pending::<()>().await;
        }
        Ok(vec![2000; 480])
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

pub fn test_state(
    config: ServerConfig,
    transcriber: Arc<ScriptedTranscriber>,
    synthesizer: Arc<RecordingSynthesizer>,
) -> Arc<AppState> {
    let core = CoreState::from_parts(transcriber, Arc::new(ParrotResponder), synthesizer);
    AppState::with_core_state(config, core)
}

/// Serve the application on an ephemeral local port.
pub async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::create_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn start_frame(caller: &str) -> Value {
    json!({
        "event": "start",
        "sequenceNumber": "1",
        "streamSid": STREAM_SID,
        "start": {
            "streamSid": STREAM_SID,
            "accountSid": "AC0000",
            "callSid": "CA0000",
            "tracks": ["inbound"],
            "mediaFormat": {"encoding": "audio/x-mulaw", "sampleRate": 8000, "channels": 1},
            "customParameters": {"caller": caller}
        }
    })
}

pub fn media_frame(pcm: &[i16], chunk: u64) -> Value {
    json!({
        "event": "media",
        "sequenceNumber": (chunk + 2).to_string(),
        "streamSid": STREAM_SID,
        "media": {
            "track": "inbound",
            "chunk": chunk.to_string(),
            "timestamp": (chunk * 20).to_string(),
            "payload": BASE64.encode(codec::encode(pcm))
        }
    })
}

pub fn loud_pcm() -> Vec<i16> {
    (0..codec::FRAME_SAMPLES)
        .map(|i| if i % 2 == 0 { 3000 } else { -3000 })
        .collect()
}

pub fn quiet_pcm() -> Vec<i16> {
    vec![0; codec::FRAME_SAMPLES]
}

pub fn mark_frame(name: &str) -> Value {
    json!({"event": "mark", "streamSid": STREAM_SID, "mark": {"name": name}})
}

pub fn stop_frame() -> Value {
    json!({"event": "stop", "streamSid": STREAM_SID, "stop": {"callSid": "CA0000"}})
}
