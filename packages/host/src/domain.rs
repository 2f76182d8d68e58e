//! Session registry of the development host.
//!
//! Pure state: every operation returns the envelopes to deliver instead of
//! sending them, so the rules are testable without sockets.
//!
//! ```text
//! Idle ──startServer──▶ Host
//! Idle ──joinServer──▶ Pending ──approve──▶ Guest
//!                         └──────reject────▶ Idle
//! ```

use std::sync::Arc;

use duet_shared::envelope::{ChatPayload, Command, Event};
use duet_shared::time::{Clock, timestamp_to_rfc3339};
use serde::Serialize;

/// Display colors handed out to members in admission order
pub const PALETTE: [&str; 6] = [
    "#e06c75", "#61afef", "#98c379", "#c678dd", "#e5c07b", "#56b6c2",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberStatus {
    /// Identified, not part of the session
    Idle,
    Host,
    /// Waiting for the host's decision
    Pending,
    Guest,
}

/// A live WebSocket connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub session_id: String,
    pub username: String,
    pub color: Option<String>,
    pub status: MemberStatus,
    /// RFC 3339 (UTC)
    pub connected_at: String,
}

/// An envelope addressed to one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: String,
    pub event: Event,
}

impl Delivery {
    fn new(to: &str, event: Event) -> Self {
        Self {
            to: to.to_string(),
            event,
        }
    }
}

fn error(to: &str, message: impl Into<String>) -> Delivery {
    Delivery::new(
        to,
        Event::Error {
            message: message.into(),
        },
    )
}

/// Connections and the single session they may belong to
pub struct Registry {
    clock: Arc<dyn Clock>,
    connections: Vec<Connection>,
    /// Session ids of the host and admitted guests, in admission order
    members: Vec<String>,
    next_color: usize,
}

impl Registry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            connections: Vec::new(),
            members: Vec::new(),
            next_color: 0,
        }
    }

    pub fn is_username_taken(&self, username: &str) -> bool {
        self.connections
            .iter()
            .any(|connection| connection.username == username)
    }

    pub fn connect(&mut self, session_id: &str, username: &str) {
        self.connections.push(Connection {
            session_id: session_id.to_string(),
            username: username.to_string(),
            color: None,
            status: MemberStatus::Idle,
            connected_at: timestamp_to_rfc3339(self.clock.now_millis()),
        });
    }

    /// Host and guests in admission order
    pub fn members(&self) -> Vec<Connection> {
        self.members
            .iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    fn get(&self, session_id: &str) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.session_id == session_id)
    }

    fn get_mut(&mut self, session_id: &str) -> Option<&mut Connection> {
        self.connections
            .iter_mut()
            .find(|connection| connection.session_id == session_id)
    }

    fn host(&self) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.status == MemberStatus::Host)
    }

    fn assign_color(&mut self) -> String {
        let color = PALETTE[self.next_color % PALETTE.len()].to_string();
        self.next_color += 1;
        color
    }

    /// Apply a command from `from` and return the envelopes it causes
    pub fn handle(&mut self, from: &str, command: Command) -> Vec<Delivery> {
        let Some(sender) = self.get(from).cloned() else {
            tracing::warn!("Command from unknown connection '{}'", from);
            return Vec::new();
        };

        match command {
            Command::Ready => vec![Delivery::new(
                from,
                Event::Identity {
                    username: sender.username,
                    session_id: Some(sender.session_id),
                },
            )],
            Command::StartServer => self.start_server(&sender),
            Command::JoinServer { address } => self.join_server(&sender, &address),
            Command::ApproveRequest { session_id } => self.approve(&sender, &session_id),
            Command::RejectRequest { session_id } => self.reject(&sender, &session_id),
            Command::ChatMessage(payload) => self.relay_chat(&sender, payload),
        }
    }

    fn start_server(&mut self, sender: &Connection) -> Vec<Delivery> {
        if sender.status != MemberStatus::Idle {
            return vec![error(&sender.session_id, "already in a session")];
        }
        if self.host().is_some() {
            return vec![error(&sender.session_id, "a session is already hosted here")];
        }

        let color = self.assign_color();
        if let Some(connection) = self.get_mut(&sender.session_id) {
            connection.status = MemberStatus::Host;
            connection.color = Some(color);
        }
        self.members.push(sender.session_id.clone());
        tracing::info!("'{}' is hosting the session", sender.username);

        vec![
            Delivery::new(&sender.session_id, Event::IsHost { value: true }),
            Delivery::new(&sender.session_id, Event::Connected),
        ]
    }

    fn join_server(&mut self, sender: &Connection, address: &str) -> Vec<Delivery> {
        if sender.status != MemberStatus::Idle {
            return vec![error(&sender.session_id, "already in a session")];
        }
        let Some(host_id) = self.host().map(|host| host.session_id.clone()) else {
            return vec![error(
                &sender.session_id,
                format!("no session is hosted at {}", address),
            )];
        };

        if let Some(connection) = self.get_mut(&sender.session_id) {
            connection.status = MemberStatus::Pending;
        }
        tracing::info!("'{}' asks to join via {}", sender.username, address);

        vec![
            Delivery::new(&sender.session_id, Event::IsHost { value: false }),
            Delivery::new(
                &host_id,
                Event::UserRequest {
                    session_id: sender.session_id.clone(),
                    username: sender.username.clone(),
                },
            ),
        ]
    }

    /// The pending target, if `sender` is the host and `target` is waiting
    fn pending_target(&self, sender: &Connection, target: &str) -> Result<Connection, Vec<Delivery>> {
        if sender.status != MemberStatus::Host {
            return Err(vec![error(
                &sender.session_id,
                "only the host can decide on join requests",
            )]);
        }
        match self.get(target) {
            Some(connection) if connection.status == MemberStatus::Pending => Ok(connection.clone()),
            _ => {
                tracing::debug!("No pending request from '{}'", target);
                Err(Vec::new())
            }
        }
    }

    fn approve(&mut self, sender: &Connection, target: &str) -> Vec<Delivery> {
        let guest = match self.pending_target(sender, target) {
            Ok(guest) => guest,
            Err(deliveries) => return deliveries,
        };

        let color = self.assign_color();
        if let Some(connection) = self.get_mut(target) {
            connection.status = MemberStatus::Guest;
            connection.color = Some(color.clone());
        }

        let existing = self.members();
        let mut deliveries = vec![Delivery::new(target, Event::Connected)];
        for member in &existing {
            deliveries.push(Delivery::new(
                target,
                Event::UserJoined {
                    session_id: member.session_id.clone(),
                    username: member.username.clone(),
                    color: member.color.clone().unwrap_or_default(),
                },
            ));
        }
        for member in &existing {
            deliveries.push(Delivery::new(
                &member.session_id,
                Event::UserJoined {
                    session_id: guest.session_id.clone(),
                    username: guest.username.clone(),
                    color: color.clone(),
                },
            ));
        }

        self.members.push(guest.session_id.clone());
        tracing::info!("'{}' joined the session", guest.username);
        deliveries
    }

    fn reject(&mut self, sender: &Connection, target: &str) -> Vec<Delivery> {
        let guest = match self.pending_target(sender, target) {
            Ok(guest) => guest,
            Err(deliveries) => return deliveries,
        };

        if let Some(connection) = self.get_mut(target) {
            connection.status = MemberStatus::Idle;
        }
        tracing::info!("'{}' was turned away", guest.username);
        vec![error(target, "join request rejected")]
    }

    fn relay_chat(&mut self, sender: &Connection, payload: ChatPayload) -> Vec<Delivery> {
        if !matches!(sender.status, MemberStatus::Host | MemberStatus::Guest) {
            return vec![error(&sender.session_id, "not in a session")];
        }

        let timestamp = if payload.timestamp > 0 {
            payload.timestamp
        } else {
            self.clock.now_millis()
        };
        let stamped = ChatPayload {
            username: sender.username.clone(),
            color: sender.color.clone().unwrap_or_default(),
            timestamp,
            ..payload
        };

        self.members
            .iter()
            .map(|id| Delivery::new(id, Event::ChatMessage(stamped.clone())))
            .collect()
    }

    /// Forget `session_id` and notify whoever is affected
    pub fn disconnect(&mut self, session_id: &str) -> Vec<Delivery> {
        let Some(index) = self
            .connections
            .iter()
            .position(|connection| connection.session_id == session_id)
        else {
            return Vec::new();
        };
        let gone = self.connections.remove(index);
        self.members.retain(|id| id != session_id);

        let left = Event::UserLeft {
            session_id: gone.session_id.clone(),
        };
        match gone.status {
            MemberStatus::Idle => Vec::new(),
            MemberStatus::Pending => self
                .host()
                .map(|host| vec![Delivery::new(&host.session_id, left)])
                .unwrap_or_default(),
            MemberStatus::Guest => self
                .members
                .iter()
                .map(|id| Delivery::new(id, left.clone()))
                .collect(),
            MemberStatus::Host => {
                tracing::info!("Host '{}' left; closing the session", gone.username);
                self.members.clear();
                self.connections
                    .iter_mut()
                    .filter(|connection| connection.status != MemberStatus::Idle)
                    .map(|connection| {
                        connection.status = MemberStatus::Idle;
                        connection.color = None;
                        error(&connection.session_id, "host left the session")
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_shared::time::FixedClock;

    const NOW: i64 = 1_672_531_200_000;

    fn registry() -> Registry {
        let mut registry = Registry::new(Arc::new(FixedClock::new(NOW)));
        registry.connect("h", "Host");
        registry.connect("a", "Alice");
        registry.connect("b", "Bob");
        registry
    }

    fn hosted() -> Registry {
        let mut registry = registry();
        registry.handle("h", Command::StartServer);
        registry
    }

    fn join(registry: &mut Registry, id: &str) -> Vec<Delivery> {
        registry.handle(
            id,
            Command::JoinServer {
                address: "ws://localhost".to_string(),
            },
        )
    }

    fn approve(registry: &mut Registry, id: &str) -> Vec<Delivery> {
        registry.handle(
            "h",
            Command::ApproveRequest {
                session_id: id.to_string(),
            },
        )
    }

    #[test]
    fn test_ready_is_answered_with_identity() {
        // テスト項目: ready に対して username と session id を含む identity が返る
        // given (前提条件):
        let mut registry = registry();

        // when (操作):
        let deliveries = registry.handle("a", Command::Ready);

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![Delivery::new(
                "a",
                Event::Identity {
                    username: "Alice".to_string(),
                    session_id: Some("a".to_string()),
                }
            )]
        );
    }

    #[test]
    fn test_start_server_makes_sender_host() {
        // テスト項目: 最初の startServer で送信者がホストになり connected を受け取る
        // given (前提条件):
        let mut registry = registry();

        // when (操作):
        let deliveries = registry.handle("h", Command::StartServer);

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![
                Delivery::new("h", Event::IsHost { value: true }),
                Delivery::new("h", Event::Connected),
            ]
        );
        assert_eq!(registry.members()[0].status, MemberStatus::Host);
    }

    #[test]
    fn test_second_host_is_refused() {
        // テスト項目: ホストが既にいる場合、2 人目の startServer はエラーになる
        // given (前提条件):
        let mut registry = hosted();

        // when (操作):
        let deliveries = registry.handle("a", Command::StartServer);

        // then (期待する結果):
        assert_eq!(deliveries, vec![error("a", "a session is already hosted here")]);
    }

    #[test]
    fn test_join_forwards_request_to_host() {
        // テスト項目: joinServer で送信者は is-host false を受け取り、ホストに user-request が届く
        // given (前提条件):
        let mut registry = hosted();

        // when (操作):
        let deliveries = join(&mut registry, "a");

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![
                Delivery::new("a", Event::IsHost { value: false }),
                Delivery::new(
                    "h",
                    Event::UserRequest {
                        session_id: "a".to_string(),
                        username: "Alice".to_string(),
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_join_without_host_is_an_error() {
        // テスト項目: ホストがいない状態の joinServer はエラーになる
        // given (前提条件):
        let mut registry = registry();

        // when (操作):
        let deliveries = join(&mut registry, "a");

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![error("a", "no session is hosted at ws://localhost")]
        );
    }

    #[test]
    fn test_approve_introduces_guest_and_members_in_join_order() {
        // テスト項目: 承認したゲストに既存メンバーが参加順で通知され、既存メンバーにゲストが通知される
        // given (前提条件):
        let mut registry = hosted();
        join(&mut registry, "a");
        approve(&mut registry, "a");
        join(&mut registry, "b");

        // when (操作):
        let deliveries = approve(&mut registry, "b");

        // then (期待する結果):
        let to_bob: Vec<&Event> = deliveries
            .iter()
            .filter(|delivery| delivery.to == "b")
            .map(|delivery| &delivery.event)
            .collect();
        assert_eq!(to_bob[0], &Event::Connected);
        assert_eq!(
            to_bob[1..]
                .iter()
                .map(|event| match event {
                    Event::UserJoined { username, .. } => username.as_str(),
                    _ => "",
                })
                .collect::<Vec<_>>(),
            vec!["Host", "Alice"]
        );
        let notified: Vec<&str> = deliveries
            .iter()
            .filter(|delivery| delivery.to != "b")
            .map(|delivery| delivery.to.as_str())
            .collect();
        assert_eq!(notified, vec!["h", "a"]);
    }

    #[test]
    fn test_only_host_can_approve() {
        // テスト項目: ホスト以外の approve-request はエラーになる
        // given (前提条件):
        let mut registry = hosted();
        join(&mut registry, "a");
        join(&mut registry, "b");

        // when (操作):
        let deliveries = registry.handle(
            "a",
            Command::ApproveRequest {
                session_id: "b".to_string(),
            },
        );

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![error("a", "only the host can decide on join requests")]
        );
    }

    #[test]
    fn test_reject_sends_error_to_requester() {
        // テスト項目: 拒否されたリクエスト者に error が届き、Idle に戻る
        // given (前提条件):
        let mut registry = hosted();
        join(&mut registry, "a");

        // when (操作):
        let deliveries = registry.handle(
            "h",
            Command::RejectRequest {
                session_id: "a".to_string(),
            },
        );

        // then (期待する結果):
        assert_eq!(deliveries, vec![error("a", "join request rejected")]);
        assert!(join(&mut registry, "a").iter().any(|d| d.to == "h"));
    }

    #[test]
    fn test_chat_is_stamped_and_relayed_to_all_members() {
        // テスト項目: チャットは送信者名と色で刻印され、送信者を含む全メンバーに配信される
        // given (前提条件):
        let mut registry = hosted();
        join(&mut registry, "a");
        approve(&mut registry, "a");

        // when (操作):
        let deliveries = registry.handle(
            "a",
            Command::ChatMessage(ChatPayload {
                text: "hi @Host".to_string(),
                username: "spoofed".to_string(),
                ..ChatPayload::default()
            }),
        );

        // then (期待する結果):
        assert_eq!(
            deliveries.iter().map(|d| d.to.as_str()).collect::<Vec<_>>(),
            vec!["h", "a"]
        );
        let Event::ChatMessage(payload) = &deliveries[0].event else {
            panic!("expected chat-message");
        };
        assert_eq!(payload.username, "Alice");
        assert_eq!(payload.color, PALETTE[1]);
        assert_eq!(payload.timestamp, NOW);
        assert_eq!(payload.text, "hi @Host");
    }

    #[test]
    fn test_pending_requester_leaving_notifies_host() {
        // テスト項目: 判断前にリクエスト者が切断するとホストに user-left が届く
        // given (前提条件):
        let mut registry = hosted();
        join(&mut registry, "a");

        // when (操作):
        let deliveries = registry.disconnect("a");

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![Delivery::new(
                "h",
                Event::UserLeft {
                    session_id: "a".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_host_leaving_ends_session_for_everyone() {
        // テスト項目: ホストが切断すると残りのメンバーに error が届き、ホスト枠が空く
        // given (前提条件):
        let mut registry = hosted();
        join(&mut registry, "a");
        approve(&mut registry, "a");
        join(&mut registry, "b");

        // when (操作):
        let deliveries = registry.disconnect("h");

        // then (期待する結果):
        assert_eq!(
            deliveries,
            vec![
                error("a", "host left the session"),
                error("b", "host left the session"),
            ]
        );
        assert!(registry.members().is_empty());
        assert_eq!(
            registry.handle("a", Command::StartServer)[0],
            Delivery::new("a", Event::IsHost { value: true })
        );
    }
}
