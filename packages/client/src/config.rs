//! Client configuration.

use std::time::Duration;

use crate::domain::DEFAULT_TRIGGER;
use crate::usecase::DEFAULT_HANDSHAKE_INTERVAL;

pub const DEFAULT_HOST_URL: &str = "ws://127.0.0.1:3000/ws";
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Session action issued automatically once the host has sent `identity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAction {
    StartServer,
    JoinServer(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the host process
    pub url: String,
    pub username: String,
    pub auto_action: Option<AutoAction>,
    pub handshake_interval: Duration,
    pub mention_trigger: char,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_HOST_URL.to_string(),
            username: String::new(),
            auto_action: None,
            handshake_interval: DEFAULT_HANDSHAKE_INTERVAL,
            mention_trigger: DEFAULT_TRIGGER,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: Duration::from_secs(RECONNECT_INTERVAL_SECS),
        }
    }
}

impl ClientConfig {
    /// URL with the username as query parameter
    pub fn connect_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}username={}",
            self.url,
            separator,
            encode_query_value(&self.username)
        )
    }
}

/// Percent-encode everything outside the unreserved set
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
