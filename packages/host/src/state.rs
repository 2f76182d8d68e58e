//! Host state and connection management.

use std::{collections::HashMap, sync::Arc};

use duet_shared::time::Clock;
use serde::Deserialize;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{Delivery, Registry};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub username: Option<String>,
}

/// Shared application state
///
/// Lock order is `registry` then `clients`.
pub struct AppState {
    /// Domain model: connections and the hosted session
    pub registry: Mutex<Registry>,
    /// Outbound channel of each live socket, by session id
    pub clients: Mutex<HashMap<String, mpsc::UnboundedSender<String>>>,
}

impl AppState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: Mutex::new(Registry::new(clock)),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Encode and push each delivery to its socket
    pub async fn deliver(&self, deliveries: Vec<Delivery>) {
        if deliveries.is_empty() {
            return;
        }
        let clients = self.clients.lock().await;
        for delivery in deliveries {
            let text = match delivery.event.encode() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to encode {}: {}", delivery.event.tag(), e);
                    continue;
                }
            };
            match clients.get(&delivery.to) {
                Some(sender) => {
                    if sender.send(text).is_err() {
                        tracing::warn!(
                            "Failed to send {} to '{}'",
                            delivery.event.tag(),
                            delivery.to
                        );
                    }
                }
                None => tracing::debug!("'{}' is gone; dropping {}", delivery.to, delivery.event.tag()),
            }
        }
    }
}
