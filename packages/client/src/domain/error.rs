//! Error types for the domain layer.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("session id must not be empty")]
    EmptySessionId,

    #[error("username must not be empty")]
    EmptyUsername,
}

/// Chat content errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Lines are 1-based and the range must not be inverted
    #[error("invalid line range {start}-{end}")]
    InvalidLineRange { start: u32, end: u32 },

    #[error("line range {start}-{end} is outside of '{file}' ({line_count} lines)")]
    LineRangeOutOfBounds {
        file: String,
        start: u32,
        end: u32,
        line_count: usize,
    },

    #[error("invalid sender: {0}")]
    InvalidSender(#[from] ValueObjectError),
}

/// Errors raised while handing an envelope to the transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The outbound half of the connection is gone
    #[error("transport closed")]
    Closed,
}
