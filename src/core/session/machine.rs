//! The per-call state machine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::config::SessionConfig;
use super::errors::{SessionError, SessionResult};
use super::state::{CallIdentity, SessionState};
use crate::core::codec;
use crate::core::protocol::{InboundFrame, MediaPayload, StartPayload};
use crate::core::sequencer::{AckOutcome, FrameSink, OutboundSequencer};
use crate::core::state::CoreState;
use crate::core::utterance::UtteranceBuffer;

/// What a turn says.
enum Turn {
    Greeting,
    /// Cropped caller utterance to transcribe and answer.
    Reply(Vec<i16>),
}

/// One live call.
///
/// Frames are handled strictly one at a time; a respond cycle runs inside the
/// handling of the frame that finished the utterance. The cancellation token
/// is shared with the transport: cancelling it abandons any turn in flight,
/// and the session cancels it itself when it terminates.
pub struct Session {
    config: SessionConfig,
    core: Arc<CoreState>,
    sequencer: OutboundSequencer,
    cancel: CancellationToken,

    state: SessionState,
    call: Option<CallIdentity>,
    buffer: UtteranceBuffer,
    last_chunk: Option<u64>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        core: Arc<CoreState>,
        sink: Arc<dyn FrameSink>,
        cancel: CancellationToken,
    ) -> Self {
        let sequencer = OutboundSequencer::new(sink, config.playback_chunk_bytes);
        let buffer = UtteranceBuffer::new(config.vad);
        Self {
            config,
            core,
            sequencer,
            cancel,
            state: SessionState::AwaitingStart,
            call: None,
            buffer,
            last_chunk: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True unless agent audio is outstanding (or the call is not live).
    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening
    }

    pub fn call(&self) -> Option<&CallIdentity> {
        self.call.as_ref()
    }

    pub fn buffer(&self) -> &UtteranceBuffer {
        &self.buffer
    }

    pub fn has_outstanding_mark(&self) -> bool {
        self.sequencer.has_outstanding()
    }

    /// Drive the session from a frame channel until stop, disconnect or
    /// cancellation.
    pub async fn run(mut self, mut frames: mpsc::Receiver<InboundFrame>) {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                frame = frames.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            if !self.handle_frame(frame).await {
                break;
            }
        }
        self.terminate();
    }

    /// Process one inbound frame. Returns whether the session is still live.
    pub async fn handle_frame(&mut self, frame: InboundFrame) -> bool {
        if self.state == SessionState::Terminated {
            trace!(event = frame.event(), "Ignoring frame after termination");
            return false;
        }

        match frame {
            InboundFrame::Connected { protocol } => {
                debug!(?protocol, "Media stream connected");
            }
            InboundFrame::Start { stream_sid, start } => {
                self.handle_start(stream_sid, start).await;
            }
            InboundFrame::Media { media, .. } => {
                self.handle_media(media).await;
            }
            InboundFrame::Mark { mark, .. } => {
                self.handle_mark(&mark.name);
            }
            InboundFrame::Stop { .. } => {
                info!("Media stream stopped");
                self.terminate();
            }
        }

        self.state != SessionState::Terminated
    }

    async fn handle_start(&mut self, stream_sid: Option<String>, start: StartPayload) {
        if self.state != SessionState::AwaitingStart {
            warn!("Ignoring duplicate start frame");
            return;
        }

        let Some(stream_id) = stream_sid.or_else(|| start.stream_sid.clone()) else {
            warn!("Dropping start frame without streamSid");
            return;
        };

        if let Some(format) = &start.media_format
            && !format.is_expected()
        {
            warn!(
                encoding = %format.encoding,
                sample_rate = format.sample_rate,
                channels = format.channels,
                "Unexpected media format; assuming 8 kHz mu-law"
            );
        }

        let caller_id = start.caller_id();
        info!(caller_id = %caller_id, stream_id = %stream_id, "Session started");

        self.call = Some(CallIdentity {
            caller_id,
            stream_id,
        });
        self.buffer = UtteranceBuffer::new(self.config.vad);
        self.state = SessionState::Listening;

        self.run_turn(Turn::Greeting).await;
    }

    async fn handle_media(&mut self, media: MediaPayload) {
        let Some(stream_id) = self.call.as_ref().map(|c| c.stream_id.clone()) else {
            debug!("Dropping media before start");
            return;
        };

        if media.is_outbound() {
            trace!("Ignoring outbound track media");
            return;
        }

        if let Some(chunk) = media.chunk_number() {
            if let Some(last) = self.last_chunk
                && chunk != last + 1
            {
                debug!(expected = last + 1, received = chunk, "Media chunk out of sequence");
            }
            self.last_chunk = Some(chunk);
        }

        let wire = match media.decode_audio() {
            Ok(wire) => wire,
            Err(e) => {
                warn!(error = %e, "Dropping media frame");
                return;
            }
        };

        let had_started = self.buffer.has_started();
        self.buffer.append(&codec::decode(&wire));

        if !had_started && self.buffer.has_started() {
            debug!(state = %self.state, "Caller speech onset; clearing queued playback");
            if let Err(e) = self.sequencer.emit_interrupt(&stream_id).await {
                warn!(error = %e, "Failed to send clear");
            }
        }

        if self.state == SessionState::Listening && self.buffer.has_finished() {
            self.respond().await;
        }
    }

    fn handle_mark(&mut self, label: &str) {
        match self.sequencer.acknowledge(label) {
            AckOutcome::Matched => {
                if self.state == SessionState::Speaking {
                    self.state = SessionState::Listening;
                    info!(label, "Playback acknowledged; listening");
                }
            }
            AckOutcome::Mismatched => {}
            AckOutcome::Unexpected => {
                warn!(label, state = %self.state, "Mark received with no outstanding request");
            }
        }
    }

    /// Swap in a fresh buffer and answer the finished one.
    async fn respond(&mut self) {
        let finished = std::mem::replace(&mut self.buffer, UtteranceBuffer::new(self.config.vad));
        let audio = match finished.crop() {
            Ok(audio) => audio,
            Err(e) => {
                error!(error = %e, "Utterance crop failed");
                return;
            }
        };

        debug!(
            duration_ms = codec::samples_to_ms(audio.len()),
            "Utterance complete"
        );
        self.state = SessionState::Speaking;
        self.run_turn(Turn::Reply(audio)).await;
    }

    async fn run_turn(&mut self, turn: Turn) {
        let cancel = self.cancel.clone();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.execute_turn(turn) => result,
        };

        match result {
            Ok(()) => {}
            Err(SessionError::Cancelled) => {
                info!("Respond cycle abandoned");
                self.terminate();
            }
            Err(e) => {
                // Nothing was queued, so no mark will come back; the call
                // stays in Speaking until the caller hangs up.
                error!(error = %e, "Respond cycle failed");
            }
        }
    }

    async fn execute_turn(&mut self, turn: Turn) -> SessionResult<()> {
        let text = match turn {
            Turn::Greeting => self.config.greeting.clone(),
            Turn::Reply(audio) => {
                let transcript = self.core.transcriber.transcribe(&audio).await?;
                let transcript = transcript.trim();
                if transcript.is_empty() {
                    debug!("Empty transcript; resuming listening");
                    self.state = SessionState::Listening;
                    return Ok(());
                }
                info!(transcript, "Caller said");
                self.core.responder.respond(transcript).await?
            }
        };
        self.speak(&text).await
    }

    async fn speak(&mut self, text: &str) -> SessionResult<()> {
        let stream_id = self
            .call
            .as_ref()
            .map(|c| c.stream_id.clone())
            .ok_or(SessionError::NotStarted)?;

        self.state = SessionState::Speaking;
        info!(text, "Speaking");

        let audio = self.core.synthesizer.synthesize(text).await?;
        let wire = codec::encode(&audio);
        self.sequencer.emit_playback(&stream_id, &wire).await?;
        self.sequencer
            .emit_ack(&stream_id, &self.config.mark_label)
            .await?;
        Ok(())
    }

    fn terminate(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        info!(from = %self.state, "Session terminated");
        self.state = SessionState::Terminated;
        self.cancel.cancel();
    }
}
