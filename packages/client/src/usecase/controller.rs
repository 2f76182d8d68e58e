//! UseCase: エンベロープのディスパッチとローカル操作
//!
//! 受信したエンベロープはタグごとに 1 つの match で処理し、各ケースは
//! 自分の状態だけを更新して `Vec<Effect>` を返す。描画や送信は呼び出し側
//! (セッションループ) が行うため、ここはトランスポートなしでテストできる。

use std::sync::Arc;

use duet_shared::envelope::{ChatPayload, CodeReferencePayload, Command, Event};
use duet_shared::time::Clock;
use tracing::{debug, info, warn};

use crate::domain::{
    ChatMessage, ChatMessageView, CodeReference, ConnectionPhase, LocalIdentity, MentionKey,
    MentionSession, ParticipantRecord, ParticipantRoster, PendingRequest, PendingRequestQueue,
    SessionId, SessionStateMachine, Username,
};

use super::effect::{Effect, KeyOutcome, MentionSuggestions, UiUpdate};

/// Owns every piece of client state and turns inputs into effects
pub struct SessionController {
    trigger: char,
    clock: Arc<dyn Clock>,
    session: SessionStateMachine,
    roster: ParticipantRoster,
    pending: PendingRequestQueue,
    mention: MentionSession,
    input: String,
    cursor: usize,
    messages: Vec<ChatMessageView>,
}

impl SessionController {
    pub fn new(trigger: char, clock: Arc<dyn Clock>) -> Self {
        Self {
            trigger,
            clock,
            session: SessionStateMachine::new(),
            roster: ParticipantRoster::new(),
            pending: PendingRequestQueue::new(),
            mention: MentionSession::default(),
            input: String::new(),
            cursor: 0,
            messages: Vec::new(),
        }
    }

    pub fn session(&self) -> &SessionStateMachine {
        &self.session
    }

    pub fn roster(&self) -> &ParticipantRoster {
        &self.roster
    }

    pub fn pending(&self) -> &PendingRequestQueue {
        &self.pending
    }

    pub fn mention(&self) -> &MentionSession {
        &self.mention
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Rendered messages in arrival order
    pub fn messages(&self) -> &[ChatMessageView] {
        &self.messages
    }

    /// Decode raw text from the transport and dispatch it.
    ///
    /// Protocol violations are logged and dropped.
    pub fn dispatch_text(&mut self, text: &str) -> Vec<Effect> {
        match Event::decode(text) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                warn!("Ignoring envelope from host: {}", e);
                Vec::new()
            }
        }
    }

    /// Route an inbound envelope to the component that owns its tag
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        debug!(tag = event.tag(), "Dispatching envelope");
        match event {
            Event::Identity {
                username,
                session_id,
            } => self.on_identity(username, session_id),
            Event::Connected => self.on_connected(),
            Event::IsHost { value } => self.on_is_host(value),
            Event::UserRequest {
                session_id,
                username,
            } => self.on_user_request(session_id, username),
            Event::UserJoined {
                session_id,
                username,
                color,
            } => self.on_user_joined(session_id, username, color),
            Event::UserLeft { session_id } => self.on_user_left(session_id),
            Event::ChatMessage(payload) => self.on_chat_message(payload),
            Event::Error { message } => self.on_error(message),
        }
    }

    fn on_identity(&mut self, username: String, session_id: Option<String>) -> Vec<Effect> {
        let username = match Username::new(username) {
            Ok(username) => username,
            Err(e) => {
                warn!("Ignoring identity: {}", e);
                return Vec::new();
            }
        };
        let session_id = session_id.and_then(|id| SessionId::new(id).ok());
        let shown = username.as_str().to_string();

        if !self.session.set_identity(LocalIdentity {
            username,
            session_id,
        }) {
            warn!(username = %shown, "Ignoring duplicate identity");
            return Vec::new();
        }

        info!(username = %shown, "Identity received");
        vec![
            Effect::StopHandshake,
            Effect::Ui(UiUpdate::Identity { username: shown }),
        ]
    }

    fn on_connected(&mut self) -> Vec<Effect> {
        if !self.session.on_connected() {
            debug!(phase = ?self.session.phase(), "Ignoring connected");
            return Vec::new();
        }
        info!("Connected to session");
        vec![Effect::Ui(UiUpdate::Phase(ConnectionPhase::Connected))]
    }

    fn on_is_host(&mut self, value: bool) -> Vec<Effect> {
        if !self.session.assign_role(value) {
            debug!(value, role = ?self.session.role(), "Ignoring repeated role classification");
            return Vec::new();
        }
        info!(role = ?self.session.role(), "Role assigned");
        vec![Effect::Ui(UiUpdate::Role(self.session.role()))]
    }

    fn on_user_request(&mut self, session_id: String, username: String) -> Vec<Effect> {
        if !self.session.is_host() {
            debug!(%session_id, "Ignoring join request: not the host");
            return Vec::new();
        }
        let (session_id, username) = match (SessionId::new(session_id), Username::new(username)) {
            (Ok(session_id), Ok(username)) => (session_id, username),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Ignoring join request: {}", e);
                return Vec::new();
            }
        };
        if self.roster.contains(&session_id) {
            debug!(%session_id, "Ignoring join request from an existing participant");
            return Vec::new();
        }

        let request = PendingRequest::new(session_id, username);
        info!("{}", request.prompt());
        self.pending.on_user_request(request);
        vec![self.pending_update()]
    }

    fn on_user_joined(&mut self, session_id: String, username: String, color: String) -> Vec<Effect> {
        let (session_id, username) = match (SessionId::new(session_id), Username::new(username)) {
            (Ok(session_id), Ok(username)) => (session_id, username),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Ignoring user-joined: {}", e);
                return Vec::new();
            }
        };
        if self.session.is_local(&session_id) {
            debug!("Ignoring user-joined for the local user");
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.pending.drop_requester(&session_id) {
            effects.push(self.pending_update());
        }

        info!(%session_id, username = %username, "Participant joined");
        self.roster
            .add_participant(ParticipantRecord::new(session_id, username, color));
        effects.push(self.participants_update());
        effects.extend(self.refresh_mention());
        effects
    }

    fn on_user_left(&mut self, session_id: String) -> Vec<Effect> {
        let Ok(session_id) = SessionId::new(session_id) else {
            warn!("Ignoring user-left without a session id");
            return Vec::new();
        };

        let mut effects = Vec::new();
        if self.pending.drop_requester(&session_id) {
            debug!(%session_id, "Requester left before a decision");
            effects.push(self.pending_update());
        }
        if self.roster.remove_participant(&session_id).is_some() {
            info!(%session_id, "Participant left");
            effects.push(self.participants_update());
            effects.extend(self.refresh_mention());
        }
        effects
    }

    fn on_chat_message(&mut self, payload: ChatPayload) -> Vec<Effect> {
        let message = match ChatMessage::try_from(payload) {
            Ok(message) => message,
            Err(e) => {
                warn!("Ignoring chat message: {}", e);
                return Vec::new();
            }
        };

        let view = message.render(&self.known_usernames(), self.trigger);
        self.messages.push(view.clone());
        vec![Effect::Ui(UiUpdate::ChatMessageAppended(view))]
    }

    fn on_error(&mut self, message: String) -> Vec<Effect> {
        warn!("Host reported an error: {}", message);
        let mut effects = vec![Effect::Ui(UiUpdate::SessionError { message })];
        self.session.end_session();
        effects.extend(self.reset_session_views());
        effects
    }

    /// Local join action: submit a remote address
    pub fn join_server(&mut self, address: &str) -> Vec<Effect> {
        let address = address.trim();
        if address.is_empty() {
            debug!("Ignoring join with an empty address");
            return Vec::new();
        }
        if !self.session.begin_connecting() {
            debug!(phase = ?self.session.phase(), "Ignoring join: session already in progress");
            return Vec::new();
        }
        info!(address, "Joining session");
        vec![
            Effect::Send(Command::JoinServer {
                address: address.to_string(),
            }),
            Effect::Ui(UiUpdate::Phase(ConnectionPhase::Connecting)),
        ]
    }

    /// Local action: host a session without a remote address
    pub fn start_server(&mut self) -> Vec<Effect> {
        if !self.session.begin_connecting() {
            debug!(phase = ?self.session.phase(), "Ignoring start: session already in progress");
            return Vec::new();
        }
        info!("Starting session as host");
        vec![
            Effect::Send(Command::StartServer),
            Effect::Ui(UiUpdate::Phase(ConnectionPhase::Connecting)),
        ]
    }

    pub fn approve(&mut self, session_id: &str) -> Vec<Effect> {
        self.decide(session_id, true)
    }

    pub fn reject(&mut self, session_id: &str) -> Vec<Effect> {
        self.decide(session_id, false)
    }

    fn decide(&mut self, session_id: &str, approve: bool) -> Vec<Effect> {
        if !self.session.is_host() {
            debug!(session_id, "Ignoring decision: not the host");
            return Vec::new();
        }
        let Ok(session_id) = SessionId::try_from(session_id) else {
            return Vec::new();
        };
        let decision = if approve {
            self.pending.approve(&session_id)
        } else {
            self.pending.reject(&session_id)
        };
        let Some(decision) = decision else {
            debug!(%session_id, "Ignoring decision for an unknown request");
            return Vec::new();
        };

        info!(%session_id, approved = decision.approved, "Join request decided");
        vec![
            Effect::Send(Command::from(decision)),
            self.pending_update(),
        ]
    }

    /// The chat input changed; re-evaluate the mention session
    pub fn input_changed(&mut self, text: &str, cursor: usize) -> Vec<Effect> {
        self.input = text.to_string();
        self.cursor = cursor;

        let before = self.mention_suggestions();
        self.mention.update(
            &self.input,
            self.cursor,
            self.roster.list_participants(),
            self.trigger,
        );
        let after = self.mention_suggestions();

        if before == after {
            Vec::new()
        } else {
            vec![Effect::Ui(UiUpdate::MentionSuggestions(after))]
        }
    }

    pub fn key_pressed(&mut self, key: MentionKey) -> KeyOutcome {
        match key {
            MentionKey::ArrowDown | MentionKey::ArrowUp => {
                if self.mention.navigate(key) {
                    KeyOutcome::Consumed(vec![self.mention_update()])
                } else {
                    KeyOutcome::PassThrough
                }
            }
            MentionKey::Enter => match self.mention.commit(&self.input, self.trigger) {
                Some(commit) => {
                    debug!(username = %commit.username, "Mention committed");
                    self.input = commit.text;
                    self.cursor = commit.cursor;
                    KeyOutcome::Consumed(vec![
                        Effect::Ui(UiUpdate::ChatInput {
                            text: self.input.clone(),
                            cursor: self.cursor,
                        }),
                        Effect::Ui(UiUpdate::MentionSuggestions(None)),
                    ])
                }
                None => KeyOutcome::PassThrough,
            },
            MentionKey::Escape => {
                if self.mention.is_active() {
                    self.mention.dismiss();
                    KeyOutcome::Consumed(vec![Effect::Ui(UiUpdate::MentionSuggestions(None))])
                } else {
                    KeyOutcome::PassThrough
                }
            }
        }
    }

    /// Send the chat input. Mentions travel verbatim inside the text.
    pub fn submit(&mut self, text: &str, reference: Option<&CodeReference>) -> Vec<Effect> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if self.session.phase() != ConnectionPhase::Connected {
            debug!(phase = ?self.session.phase(), "Ignoring chat message outside of a session");
            return Vec::new();
        }

        let username = self
            .session
            .identity()
            .map(|identity| identity.username.as_str().to_string())
            .unwrap_or_default();
        let payload = ChatPayload {
            text: text.to_string(),
            username,
            color: String::new(),
            timestamp: self.clock.now_millis(),
            reference: reference.map(CodeReferencePayload::from),
        };

        self.input.clear();
        self.cursor = 0;
        let mut effects = vec![
            Effect::Send(Command::ChatMessage(payload)),
            Effect::Ui(UiUpdate::ChatInput {
                text: String::new(),
                cursor: 0,
            }),
        ];
        if self.mention.is_active() {
            effects.push(Effect::Ui(UiUpdate::MentionSuggestions(None)));
        }
        self.mention.close();
        effects
    }

    /// The transport to the host is gone
    pub fn transport_closed(&mut self) -> Vec<Effect> {
        info!("Transport closed");
        self.session.transport_closed();
        self.reset_session_views()
    }

    fn reset_session_views(&mut self) -> Vec<Effect> {
        self.roster.clear();
        self.pending.clear();
        let mut effects = vec![
            Effect::Ui(UiUpdate::Phase(self.session.phase())),
            Effect::Ui(UiUpdate::Role(self.session.role())),
            self.participants_update(),
            self.pending_update(),
        ];
        if self.mention.is_active() {
            effects.push(Effect::Ui(UiUpdate::MentionSuggestions(None)));
        }
        self.mention.close();
        effects
    }

    fn refresh_mention(&mut self) -> Option<Effect> {
        if !self.mention.is_active() {
            return None;
        }
        let before = self.mention_suggestions();
        self.mention
            .refresh_candidates(self.roster.list_participants());
        let after = self.mention_suggestions();
        (before != after).then(|| Effect::Ui(UiUpdate::MentionSuggestions(after)))
    }

    fn mention_suggestions(&self) -> Option<MentionSuggestions> {
        let filter_text = self.mention.filter_text()?;
        Some(MentionSuggestions {
            filter_text: filter_text.to_string(),
            selected_index: self.mention.selected_index().unwrap_or_default(),
            usernames: self
                .mention
                .candidates()
                .iter()
                .map(|record| record.username.as_str().to_string())
                .collect(),
        })
    }

    fn mention_update(&self) -> Effect {
        Effect::Ui(UiUpdate::MentionSuggestions(self.mention_suggestions()))
    }

    fn participants_update(&self) -> Effect {
        Effect::Ui(UiUpdate::Participants(
            self.roster.list_participants().to_vec(),
        ))
    }

    fn pending_update(&self) -> Effect {
        Effect::Ui(UiUpdate::PendingRequests {
            requests: self.pending.list().to_vec(),
            visible: self.pending.is_visible(),
        })
    }

    fn known_usernames(&self) -> Vec<String> {
        self.roster
            .list_participants()
            .iter()
            .map(|record| record.username.as_str().to_string())
            .chain(
                self.session
                    .identity()
                    .map(|identity| identity.username.as_str().to_string()),
            )
            .collect()
    }
}
