//! Integration tests driving the host over real WebSocket connections.

use std::{sync::Arc, time::Duration};

use duet_host::Server;
use duet_shared::{
    envelope::{ChatPayload, Command, Event},
    time::SystemClock,
};
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper struct to manage an in-process host
struct TestHost {
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestHost {
    async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let port = listener.local_addr().expect("No local addr").port();
        let (shutdown, rx) = oneshot::channel::<()>();

        let server = Server::new(Arc::new(SystemClock));
        tokio::spawn(server.serve(listener, async move {
            let _ = rx.await;
        }));

        TestHost {
            port,
            shutdown: Some(shutdown),
        }
    }

    fn ws_url(&self, username: &str) -> String {
        format!("ws://127.0.0.1:{}/ws?username={}", self.port, username)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn connect(host: &TestHost, username: &str) -> Socket {
    let (socket, _) = connect_async(host.ws_url(username))
        .await
        .expect("Failed to connect");
    socket
}

async fn send(socket: &mut Socket, command: Command) {
    let text = command.encode().expect("Failed to encode");
    socket
        .send(Message::Text(text.into()))
        .await
        .expect("Failed to send");
}

async fn next_event(socket: &mut Socket) -> Event {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("Timed out waiting for an event")
            .expect("Socket closed")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return Event::decode(&text).expect("Failed to decode event");
        }
    }
}

/// Connect, send ready, and return the socket with its session id
async fn identify(host: &TestHost, username: &str) -> (Socket, String) {
    let mut socket = connect(host, username).await;
    send(&mut socket, Command::Ready).await;
    match next_event(&mut socket).await {
        Event::Identity {
            username: name,
            session_id: Some(session_id),
        } => {
            assert_eq!(name, username);
            (socket, session_id)
        }
        other => panic!("expected identity, got {:?}", other),
    }
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let host = TestHost::start().await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(host.http_url("/api/health"))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_duplicate_username_is_refused() {
    // テスト項目: 接続中のユーザー名と重複する接続は 409 で拒否される
    // given (前提条件):
    let host = TestHost::start().await;
    let _alice = connect(&host, "Alice").await;

    // when (操作):
    let result = connect_async(host.ws_url("Alice")).await;

    // then (期待する結果):
    match result {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 409);
        }
        other => panic!("expected HTTP 409, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_host_approves_guest_and_they_chat() {
    // テスト項目: ホストが参加を承認すると双方に参加が通知され、チャットが全員に配信される
    // given (前提条件):
    let host = TestHost::start().await;
    let (mut owner, owner_id) = identify(&host, "Host").await;
    send(&mut owner, Command::StartServer).await;
    assert_eq!(next_event(&mut owner).await, Event::IsHost { value: true });
    assert_eq!(next_event(&mut owner).await, Event::Connected);

    let (mut alice, alice_id) = identify(&host, "Alice").await;
    send(
        &mut alice,
        Command::JoinServer {
            address: "127.0.0.1".to_string(),
        },
    )
    .await;
    assert_eq!(next_event(&mut alice).await, Event::IsHost { value: false });
    assert_eq!(
        next_event(&mut owner).await,
        Event::UserRequest {
            session_id: alice_id.clone(),
            username: "Alice".to_string(),
        }
    );

    // when (操作):
    send(
        &mut owner,
        Command::ApproveRequest {
            session_id: alice_id.clone(),
        },
    )
    .await;

    // then (期待する結果):
    assert_eq!(next_event(&mut alice).await, Event::Connected);
    match next_event(&mut alice).await {
        Event::UserJoined {
            session_id,
            username,
            ..
        } => {
            assert_eq!(session_id, owner_id);
            assert_eq!(username, "Host");
        }
        other => panic!("expected user-joined, got {:?}", other),
    }
    match next_event(&mut owner).await {
        Event::UserJoined { username, .. } => assert_eq!(username, "Alice"),
        other => panic!("expected user-joined, got {:?}", other),
    }

    send(
        &mut alice,
        Command::ChatMessage(ChatPayload {
            text: "hello @Host".to_string(),
            ..ChatPayload::default()
        }),
    )
    .await;
    for socket in [&mut owner, &mut alice] {
        match next_event(socket).await {
            Event::ChatMessage(payload) => {
                assert_eq!(payload.username, "Alice");
                assert_eq!(payload.text, "hello @Host");
                assert!(payload.timestamp > 0);
            }
            other => panic!("expected chat-message, got {:?}", other),
        }
    }

    let members: serde_json::Value = reqwest::get(host.http_url("/api/sessions"))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");
    let names: Vec<&str> = members
        .as_array()
        .expect("Expected an array")
        .iter()
        .filter_map(|member| member["username"].as_str())
        .collect();
    assert_eq!(names, vec!["Host", "Alice"]);

    drop(alice);
    assert_eq!(
        next_event(&mut owner).await,
        Event::UserLeft {
            session_id: alice_id
        }
    );
}

#[tokio::test]
async fn test_rejected_guest_receives_error() {
    // テスト項目: 拒否されたリクエスト者に error が届く
    // given (前提条件):
    let host = TestHost::start().await;
    let (mut owner, _) = identify(&host, "Host").await;
    send(&mut owner, Command::StartServer).await;
    next_event(&mut owner).await;
    next_event(&mut owner).await;

    let (mut bob, bob_id) = identify(&host, "Bob").await;
    send(
        &mut bob,
        Command::JoinServer {
            address: "127.0.0.1".to_string(),
        },
    )
    .await;
    next_event(&mut bob).await;
    next_event(&mut owner).await;

    // when (操作):
    send(&mut owner, Command::RejectRequest { session_id: bob_id }).await;

    // then (期待する結果):
    assert_eq!(
        next_event(&mut bob).await,
        Event::Error {
            message: "join request rejected".to_string()
        }
    );
}
