//! Session state machine: connection phase, role and local identity.
//!
//! ```text
//! Disconnected ──join / start──▶ Connecting ──connected──▶ Connected
//!      ▲                                                      │
//!      └──────────────── disconnect / error ──────────────────┘
//! ```
//!
//! The role is a side channel fixed by the first `is-host` of a session.

use super::value_object::{SessionId, Username};

/// Connection phase of the local webview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Host or guest classification of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Unknown,
    Host,
    Guest,
}

/// Identity the host assigned to this webview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub username: Username,
    /// Present when the host reports it; used to keep the local user out of the roster
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Default)]
pub struct SessionStateMachine {
    phase: ConnectionPhase,
    role: Role,
    identity: Option<LocalIdentity>,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn identity(&self) -> Option<&LocalIdentity> {
        self.identity.as_ref()
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    /// Whether `session_id` belongs to the local user
    pub fn is_local(&self, session_id: &SessionId) -> bool {
        self.identity
            .as_ref()
            .and_then(|identity| identity.session_id.as_ref())
            .is_some_and(|local| local == session_id)
    }

    /// Record the identity of this connection.
    ///
    /// Returns `false` and keeps the first identity if one is already set.
    pub fn set_identity(&mut self, identity: LocalIdentity) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(identity);
        true
    }

    /// `Disconnected -> Connecting` on a local join or start action
    pub fn begin_connecting(&mut self) -> bool {
        if self.phase != ConnectionPhase::Disconnected {
            return false;
        }
        self.phase = ConnectionPhase::Connecting;
        true
    }

    /// `Connecting -> Connected` on the transport's `connected` envelope
    pub fn on_connected(&mut self) -> bool {
        if self.phase != ConnectionPhase::Connecting {
            return false;
        }
        self.phase = ConnectionPhase::Connected;
        true
    }

    /// Fix the role for this session. Later classifications are ignored.
    pub fn assign_role(&mut self, is_host: bool) -> bool {
        if self.role != Role::Unknown {
            return false;
        }
        self.role = if is_host { Role::Host } else { Role::Guest };
        true
    }

    /// Any phase `-> Disconnected`. The identity survives: the host link is still up.
    ///
    /// The role is cleared too, so the same connection may host or join anew.
    pub fn end_session(&mut self) {
        self.phase = ConnectionPhase::Disconnected;
        self.role = Role::Unknown;
    }

    /// The host link itself is gone; a new connection gets a new identity.
    pub fn transport_closed(&mut self) {
        self.end_session();
        self.identity = None;
    }
}
