//! WebSocket connection to the host.
//!
//! ```text
//! ChannelSink ──Command──▶ write task ──Text──▶ socket
//! socket ──Text──▶ read task ──String──▶ recv()
//! ```

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, http::StatusCode, protocol::Message},
};

use crate::domain::EnvelopeSink;
use crate::error::ClientError;

use super::channel::ChannelSink;

/// Live connection; dropping it closes both directions
pub struct WebSocketConnection {
    sink: ChannelSink,
    inbound: mpsc::UnboundedReceiver<String>,
    read_task: JoinHandle<()>,
    write_task: JoinHandle<()>,
}

impl WebSocketConnection {
    /// Connect to `url`.
    ///
    /// A `409 Conflict` handshake response means the username in the query
    /// string is already held by another connection.
    pub async fn connect(url: &str, username: &str) -> Result<Self, ClientError> {
        let (ws_stream, _response) = match connect_async(url).await {
            Ok(result) => result,
            Err(WsError::Http(response)) if response.status() == StatusCode::CONFLICT => {
                return Err(ClientError::UsernameTaken(username.to_string()));
            }
            Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
        };
        tracing::info!("Connected to host at {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (sink, mut outbound) = ChannelSink::channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel::<String>();

        let read_task = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(text.as_str().to_owned()).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        tracing::warn!("Ignoring binary frame ({} bytes)", data.len());
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Host closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        let write_task = tokio::spawn(async move {
            while let Some(command) = outbound.recv().await {
                let json = match command.encode() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize {}: {}", command.tag(), e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send {}: {}", command.tag(), e);
                    break;
                }
            }
            write.close().await.ok();
        });

        Ok(Self {
            sink,
            inbound,
            read_task,
            write_task,
        })
    }

    /// Outbound half, shared with the handshake loop
    pub fn sink(&self) -> Arc<dyn EnvelopeSink> {
        Arc::new(self.sink.clone())
    }

    /// Next text frame from the host. `None` once the connection is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        self.read_task.abort();
        self.write_task.abort();
    }
}
