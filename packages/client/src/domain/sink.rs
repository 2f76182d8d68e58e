//! Outbound envelope sink trait.
//!
//! The domain only needs "hand this envelope to whatever carries it to the
//! host". The concrete carrier lives in the infrastructure layer.

use async_trait::async_trait;
use duet_shared::envelope::Command;

use super::error::TransportError;

/// Destination for envelopes sent by the webview.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnvelopeSink: Send + Sync {
    /// Queue `command` for delivery to the host
    async fn send(&self, command: Command) -> Result<(), TransportError>;
}
