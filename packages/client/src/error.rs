//! Error types for the Duet client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The host refused the username because another connection holds it
    #[error("Username '{0}' is already connected")]
    UsernameTaken(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established connection to the host went away
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Failed to initialize terminal: {0}")]
    Terminal(String),
}
