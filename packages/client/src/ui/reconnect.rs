//! Reconnection policy for the runner.
//!
//! Pure functions so the policy can be tested without a socket.

use crate::error::ClientError;

/// Whether `error` ends the client without any reconnection attempt.
///
/// A username refused by the host stays refused; retrying cannot help.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::UsernameTaken(_) | ClientError::Terminal(_)
    )
}

/// Whether the runner should try again after `error`.
///
/// # Arguments
///
/// * `error` - The error that ended the previous connection
/// * `current_attempt` - Failed attempts so far (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(error: &ClientError, current_attempt: u32, max_attempts: u32) -> bool {
    if should_exit_immediately(error) {
        return false;
    }
    current_attempt < max_attempts
}

/// Failed attempts after `error`, given `current_attempt` before it.
///
/// A connection that was established and then lost starts a fresh count.
pub fn next_attempt(error: &ClientError, current_attempt: u32) -> u32 {
    match error {
        ClientError::ConnectionLost(_) => 1,
        _ => current_attempt + 1,
    }
}
