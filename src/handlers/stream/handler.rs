//! Axum WebSocket handler for the media stream.

use std::collections::VecDeque;
use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, OwnedPermit, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::sink::ChannelSink;
use crate::core::protocol::InboundFrame;
use crate::core::session::Session;
use crate::state::AppState;

/// Capacity of both the inbound frame queue and the outbound frame queue.
///
/// At 50 media frames per second this holds about 20 s of caller audio while a
/// respond cycle is running; media beyond that is dropped.
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Upgrades the HTTP connection to a media stream WebSocket.
pub async fn stream_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("Media stream upgrade requested");
    ws.on_upgrade(move |socket| {
        let span = info_span!("stream", connection_id = %Uuid::new_v4());
        handle_media_stream(socket, state).instrument(span)
    })
}

/// Runs one call from connect to hang-up.
async fn handle_media_stream(socket: WebSocket, app_state: Arc<AppState>) {
    info!("Media stream connected");

    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(CHANNEL_BUFFER_SIZE);
    let (frame_tx, frame_rx) = mpsc::channel::<InboundFrame>(CHANNEL_BUFFER_SIZE);
    let cancel = CancellationToken::new();

    let sender_task = tokio::spawn(
        async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sender.send(Message::Text(frame.into())).await {
                    error!("Failed to send WebSocket message: {}", e);
                    return;
                }
            }
            // Session is gone; close our side.
            let _ = sender.close().await;
        }
        .in_current_span(),
    );

    let session = Session::new(
        app_state.config.session_config(),
        app_state.core_state.clone(),
        Arc::new(ChannelSink::new(outbound_tx)),
        cancel.clone(),
    );
    let session_task = tokio::spawn(session.run(frame_rx).in_current_span());

    let mut inbound = InboundQueue::new(frame_tx);

    loop {
        let msg = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = inbound.tx.clone().reserve_owned(), if inbound.has_backlog() => {
                match permit {
                    Ok(permit) => {
                        inbound.flush(permit);
                        continue;
                    }
                    Err(_) => break,
                }
            }
            msg = receiver.next() => msg,
        };

        match msg {
            Some(Ok(Message::Text(text))) => match InboundFrame::parse(text.as_str()) {
                Ok(InboundFrame::Stop { .. }) => {
                    info!("Media stream stopped by peer");
                    break;
                }
                Ok(frame) => {
                    if inbound.push(frame).is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "Dropping inbound frame"),
            },
            Some(Ok(Message::Binary(data))) => {
                warn!(bytes = data.len(), "Dropping unexpected binary message");
            }
            Some(Ok(Message::Close(_))) | None => {
                info!("Media stream closed by peer");
                break;
            }
            Some(Ok(_)) => {
                debug!("Ignoring control message");
            }
            Some(Err(e)) => {
                warn!("WebSocket error: {}", e);
                break;
            }
        }
    }

    // Abandon any respond cycle in flight.
    cancel.cancel();
    drop(inbound);

    if let Err(e) = session_task.await {
        error!("Session task failed: {}", e);
    }
    if let Err(e) = sender_task.await {
        error!("Sender task failed: {}", e);
    }

    info!("Media stream terminated");
}

/// The session went away.
#[derive(Debug, PartialEq, Eq)]
struct SessionGone;

/// Reader side of the inbound frame queue.
///
/// The reader never waits on the session, so `stop` and disconnects are seen
/// even while a respond cycle holds the session and the queue is full. Media
/// that finds the queue full is dropped. Other frames wait in a backlog that
/// is flushed, in order, as the session drains the queue.
struct InboundQueue {
    tx: mpsc::Sender<InboundFrame>,
    backlog: VecDeque<InboundFrame>,
    dropped: usize,
}

impl InboundQueue {
    fn new(tx: mpsc::Sender<InboundFrame>) -> Self {
        Self {
            tx,
            backlog: VecDeque::new(),
            dropped: 0,
        }
    }

    fn has_backlog(&self) -> bool {
        !self.backlog.is_empty()
    }

    /// Queue a frame for the session without waiting.
    fn push(&mut self, frame: InboundFrame) -> Result<(), SessionGone> {
        if self.has_backlog() {
            self.overflow(frame);
            return Ok(());
        }

        match self.tx.try_send(frame) {
            Ok(()) => {
                self.resume();
                Ok(())
            }
            Err(TrySendError::Full(frame)) => {
                self.overflow(frame);
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(SessionGone),
        }
    }

    /// Send the oldest backlogged frame into a reserved slot, then as many
    /// more as fit.
    fn flush(&mut self, permit: OwnedPermit<InboundFrame>) {
        let Some(frame) = self.backlog.pop_front() else {
            return;
        };
        permit.send(frame);

        while let Some(frame) = self.backlog.pop_front() {
            match self.tx.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(frame)) | Err(TrySendError::Closed(frame)) => {
                    self.backlog.push_front(frame);
                    return;
                }
            }
        }
        self.resume();
    }

    fn overflow(&mut self, frame: InboundFrame) {
        if matches!(frame, InboundFrame::Media { .. }) {
            if self.dropped == 0 {
                warn!("Inbound queue full; dropping media until the session catches up");
            }
            self.dropped += 1;
        } else {
            self.backlog.push_back(frame);
        }
    }

    fn resume(&mut self) {
        if self.dropped > 0 {
            warn!(dropped = self.dropped, "Inbound queue drained; media resumed");
            self.dropped = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::{MarkPayload, MediaPayload};

    fn media() -> InboundFrame {
        InboundFrame::Media {
            stream_sid: None,
            media: MediaPayload::default(),
        }
    }

    fn mark(name: &str) -> InboundFrame {
        InboundFrame::Mark {
            stream_sid: None,
            mark: MarkPayload {
                name: name.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_push_never_waits_on_a_full_queue() {
        let (tx, mut rx) = mpsc::channel(2);
        let mut inbound = InboundQueue::new(tx);

        for _ in 0..1100 {
            assert_eq!(inbound.push(media()), Ok(()));
        }
        assert_eq!(inbound.dropped, 1098);
        assert!(!inbound.has_backlog());

        // Marks are held rather than dropped, and media behind them is dropped.
        inbound.push(mark("ack")).unwrap();
        inbound.push(media()).unwrap();
        assert_eq!(inbound.backlog.len(), 1);
        assert_eq!(inbound.dropped, 1099);

        assert!(matches!(rx.recv().await, Some(InboundFrame::Media { .. })));
        let permit = inbound.tx.clone().reserve_owned().await.unwrap();
        inbound.flush(permit);
        assert!(!inbound.has_backlog());
        assert_eq!(inbound.dropped, 0);

        assert!(matches!(rx.recv().await, Some(InboundFrame::Media { .. })));
        assert_eq!(rx.recv().await, Some(mark("ack")));
    }

    #[tokio::test]
    async fn test_backlog_flushes_in_order() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut inbound = InboundQueue::new(tx);

        inbound.push(mark("first")).unwrap();
        inbound.push(mark("second")).unwrap();
        inbound.push(mark("third")).unwrap();
        assert_eq!(inbound.backlog.len(), 2);

        assert_eq!(rx.recv().await, Some(mark("first")));
        let permit = inbound.tx.clone().reserve_owned().await.unwrap();
        inbound.flush(permit);
        assert_eq!(inbound.backlog.len(), 1);

        assert_eq!(rx.recv().await, Some(mark("second")));
        let permit = inbound.tx.clone().reserve_owned().await.unwrap();
        inbound.flush(permit);
        assert!(!inbound.has_backlog());
        assert_eq!(rx.recv().await, Some(mark("third")));
    }

    #[tokio::test]
    async fn test_push_reports_closed_session() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut inbound = InboundQueue::new(tx);
        assert_eq!(inbound.push(media()), Err(SessionGone));
    }
}
