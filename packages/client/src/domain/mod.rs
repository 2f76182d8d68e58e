//! Domain layer: session state, participants, join requests, mentions and chat.
//!
//! Everything here is synchronous and free of I/O so that each rule can be
//! tested without a transport or a renderer.

mod chat;
mod error;
mod mention;
mod pending;
mod roster;
mod session;
mod sink;
mod value_object;

pub use chat::{ChatMessage, ChatMessageView, CodeBlockView, CodeReference, TextSpan, highlight_mentions};
pub use error::{ChatError, TransportError, ValueObjectError};
pub use mention::{
    DEFAULT_TRIGGER, MentionCommit, MentionKey, MentionSession, OpenMention, TriggerContext,
    filter_candidates, find_trigger_context,
};
pub use pending::{JoinDecision, PendingRequest, PendingRequestQueue};
pub use roster::{ParticipantRecord, ParticipantRoster};
pub use session::{ConnectionPhase, LocalIdentity, Role, SessionStateMachine};
pub use sink::EnvelopeSink;
#[cfg(test)]
pub use sink::MockEnvelopeSink;
pub use value_object::{SessionId, Username};
