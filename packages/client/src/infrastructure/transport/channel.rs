//! `EnvelopeSink` backed by an unbounded channel.

use async_trait::async_trait;
use duet_shared::envelope::Command;
use tokio::sync::mpsc;

use crate::domain::{EnvelopeSink, TransportError};

/// Queues commands for whoever owns the receiving half
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Command>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EnvelopeSink for ChannelSink {
    async fn send(&self, command: Command) -> Result<(), TransportError> {
        tracing::trace!(tag = command.tag(), "Queueing command");
        self.sender
            .send(command)
            .map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_forwards_to_receiver() {
        // テスト項目: 送信したコマンドが受信側にそのまま届く
        // given (前提条件):
        let (sink, mut receiver) = ChannelSink::channel();

        // when (操作):
        sink.send(Command::Ready).await.unwrap();

        // then (期待する結果):
        assert_eq!(receiver.recv().await, Some(Command::Ready));
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_reports_closed() {
        // テスト項目: 受信側が破棄された後の送信は Closed エラーになる
        // given (前提条件):
        let (sink, receiver) = ChannelSink::channel();
        drop(receiver);

        // when (操作):
        let result = sink.send(Command::Ready).await;

        // then (期待する結果):
        assert!(matches!(result, Err(TransportError::Closed)));
    }
}
