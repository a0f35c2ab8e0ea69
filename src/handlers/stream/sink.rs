use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::sequencer::{FrameSink, SinkError};

/// Outbound frame sink backed by the connection's sender channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_frame(&self, frame: String) -> Result<(), SinkError> {
        self.tx.send(frame).await.map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = ChannelSink::new(tx);
        sink.send_frame("one".into()).await.unwrap();
        sink.send_frame("two".into()).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "one");
        assert_eq!(rx.recv().await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let err = ChannelSink::new(tx)
            .send_frame("lost".into())
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }
}
