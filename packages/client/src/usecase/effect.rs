//! Effects returned by the controller.
//!
//! The controller never renders or sends anything itself; the session loop
//! executes these in order.

use duet_shared::envelope::Command;

use crate::domain::{ChatMessageView, ConnectionPhase, ParticipantRecord, PendingRequest, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a command to the transport
    Send(Command),
    /// Cancel the `ready` retry loop
    StopHandshake,
    Ui(UiUpdate),
}

/// Snapshot of the suggestion list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSuggestions {
    pub filter_text: String,
    pub selected_index: usize,
    pub usernames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// `#username-display`
    Identity { username: String },
    /// `#status-display` and section visibility
    Phase(ConnectionPhase),
    Role(Role),
    /// `#participants-list`, full list in join order
    Participants(Vec<ParticipantRecord>),
    /// `#pending-section` / `#pending-list`
    PendingRequests {
        requests: Vec<PendingRequest>,
        visible: bool,
    },
    /// Append to `#chat-messages`
    ChatMessageAppended(ChatMessageView),
    /// Replace the content of `#chat-input`
    ChatInput { text: String, cursor: usize },
    /// `#mention-suggestions`; `None` hides it
    MentionSuggestions(Option<MentionSuggestions>),
    /// Host reported a failure that ended the session
    SessionError { message: String },
}

/// Result of a key press in the chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The suggestion list handled the key
    Consumed(Vec<Effect>),
    /// Default input behavior (newline or submit)
    PassThrough,
}
