//! Element ids and pure view rules of the chat panel.
//!
//! The ids are consumed by external verification and must keep their names.

use crate::domain::{ConnectionPhase, SessionId};

pub const USERNAME_DISPLAY: &str = "username-display";
pub const STATUS_DISPLAY: &str = "status-display";
pub const CONNECTION_SECTION: &str = "connection-section";
pub const PARTICIPANTS_SECTION: &str = "participants-section";
pub const PARTICIPANTS_LIST: &str = "participants-list";
pub const PENDING_SECTION: &str = "pending-section";
pub const PENDING_LIST: &str = "pending-list";
pub const CHAT_SECTION: &str = "chat-section";
pub const CHAT_MESSAGES: &str = "chat-messages";
pub const CHAT_INPUT: &str = "chat-input";
pub const MENTION_SUGGESTIONS: &str = "mention-suggestions";

/// Id of the entry for a pending join request
pub fn pending_element_id(session_id: &SessionId) -> String {
    format!("pending-{}", session_id)
}

/// Class list of `#status-display`
pub fn status_class(phase: ConnectionPhase) -> &'static str {
    match phase {
        ConnectionPhase::Connected => "status connected",
        ConnectionPhase::Disconnected | ConnectionPhase::Connecting => "status",
    }
}

pub fn status_text(phase: ConnectionPhase) -> &'static str {
    match phase {
        ConnectionPhase::Disconnected => "Disconnected",
        ConnectionPhase::Connecting => "Connecting...",
        ConnectionPhase::Connected => "Connected",
    }
}

/// Text of `#username-display`
pub fn username_text(username: &str) -> String {
    format!("Logged in as: {}", username)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionVisibility {
    pub connection: bool,
    pub participants: bool,
    pub chat: bool,
    pub pending: bool,
}

/// Which sections are shown, from the phase and the pending queue alone
pub fn section_visibility(phase: ConnectionPhase, pending_visible: bool) -> SectionVisibility {
    let connected = phase == ConnectionPhase::Connected;
    SectionVisibility {
        connection: !connected,
        participants: connected,
        chat: connected,
        pending: pending_visible,
    }
}
