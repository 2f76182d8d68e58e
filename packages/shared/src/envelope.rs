//! Wire contract between a webview and its host process.
//!
//! Messages travel as JSON objects. Messages sent by the webview carry their
//! tag in a `command` field, messages sent by the host carry it in a `type`
//! field:
//!
//! ```text
//! webview ──{"command":"joinServer","address":"ws://…"}──▶ host
//! webview ◀──{"type":"user-joined","sessionId":"…",…}──── host
//! ```
//!
//! Decoding never panics. Anything that is not a known, well-formed envelope
//! comes back as an [`EnvelopeError`] for the caller to log and drop.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Tags of every message a webview may send.
pub const COMMAND_TAGS: [&str; 6] = [
    "ready",
    "startServer",
    "joinServer",
    "approve-request",
    "reject-request",
    "chat-message",
];

/// Tags of every message a host may send.
pub const EVENT_TAGS: [&str; 8] = [
    "identity",
    "connected",
    "is-host",
    "user-request",
    "user-joined",
    "user-left",
    "chat-message",
    "error",
];

/// Protocol violations detected while decoding or encoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Not JSON, or a known tag with a payload that does not match it
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// JSON object without the discriminating field
    #[error("envelope has no `{0}` tag")]
    MissingTag(&'static str),

    /// Discriminating field present but not part of the protocol
    #[error("unknown envelope tag `{0}`")]
    UnknownTag(String),
}

/// Code snippet attached to a chat message.
///
/// Lines are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReferencePayload {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub content: String,
}

/// Body of a `chat-message` envelope, shared by both directions.
///
/// The webview fills in what it knows; the host stamps `username`, `color`
/// and `timestamp` before relaying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub text: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<CodeReferencePayload>,
}

/// Message sent by the webview to its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all_fields = "camelCase")]
pub enum Command {
    /// Readiness signal, resent until the host answers with `identity`
    #[serde(rename = "ready")]
    Ready,

    /// Start hosting a session (the sender becomes the host)
    #[serde(rename = "startServer")]
    StartServer,

    /// Join the session reachable at `address` (the sender becomes a guest)
    #[serde(rename = "joinServer")]
    JoinServer { address: String },

    /// Host admits a pending guest
    #[serde(rename = "approve-request")]
    ApproveRequest { session_id: String },

    /// Host turns a pending guest away
    #[serde(rename = "reject-request")]
    RejectRequest { session_id: String },

    #[serde(rename = "chat-message")]
    ChatMessage(ChatPayload),
}

impl Command {
    /// Wire tag of this command
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Ready => "ready",
            Command::StartServer => "startServer",
            Command::JoinServer { .. } => "joinServer",
            Command::ApproveRequest { .. } => "approve-request",
            Command::RejectRequest { .. } => "reject-request",
            Command::ChatMessage(_) => "chat-message",
        }
    }

    /// Serialize to the JSON text sent over the wire
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a command received from a webview
    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        decode_tagged(text, "command", &COMMAND_TAGS)
    }
}

/// Message sent by the host to a webview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Event {
    /// Acknowledges `ready` and names the local user
    Identity {
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },

    /// The transport reached the session
    Connected,

    /// Role classification of this connection
    IsHost { value: bool },

    /// A guest asks the host to be let in
    UserRequest {
        session_id: String,
        username: String,
    },

    UserJoined {
        session_id: String,
        username: String,
        color: String,
    },

    UserLeft { session_id: String },

    ChatMessage(ChatPayload),

    /// Host-side failure that ends the session for this webview
    Error { message: String },
}

impl Event {
    /// Wire tag of this event
    pub fn tag(&self) -> &'static str {
        match self {
            Event::Identity { .. } => "identity",
            Event::Connected => "connected",
            Event::IsHost { .. } => "is-host",
            Event::UserRequest { .. } => "user-request",
            Event::UserJoined { .. } => "user-joined",
            Event::UserLeft { .. } => "user-left",
            Event::ChatMessage(_) => "chat-message",
            Event::Error { .. } => "error",
        }
    }

    /// Serialize to the JSON text sent over the wire
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an event received from the host
    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        decode_tagged(text, "type", &EVENT_TAGS)
    }
}

fn decode_tagged<T: DeserializeOwned>(
    text: &str,
    tag_field: &'static str,
    known_tags: &[&str],
) -> Result<T, EnvelopeError> {
    let value: Value = serde_json::from_str(text)?;

    let tag = value
        .get(tag_field)
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingTag(tag_field))?;
    if !known_tags.contains(&tag) {
        return Err(EnvelopeError::UnknownTag(tag.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_uses_command_tag_and_camel_case_fields() {
        // テスト項目: webview からのメッセージは `command` タグと camelCase フィールドで送られる
        // given (前提条件):
        let command = Command::ApproveRequest {
            session_id: "user-123".to_string(),
        };

        // when (操作):
        let value: Value = serde_json::from_str(&command.encode().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"command": "approve-request", "sessionId": "user-123"})
        );
    }

    #[test]
    fn test_ready_and_join_server_wire_format() {
        // テスト項目: ready と joinServer がホストの期待する形式になる
        // given (前提条件):
        let ready = Command::Ready;
        let join = Command::JoinServer {
            address: "ws://mock-server".to_string(),
        };

        // when (操作):
        let ready_value: Value = serde_json::from_str(&ready.encode().unwrap()).unwrap();
        let join_value: Value = serde_json::from_str(&join.encode().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(ready_value, json!({"command": "ready"}));
        assert_eq!(
            join_value,
            json!({"command": "joinServer", "address": "ws://mock-server"})
        );
    }

    #[test]
    fn test_decode_user_request_event() {
        // テスト項目: user-request イベントがデコードされる
        // given (前提条件):
        let text = r#"{"type":"user-request","sessionId":"user-123","username":"GuestUser"}"#;

        // when (操作):
        let event = Event::decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            Event::UserRequest {
                session_id: "user-123".to_string(),
                username: "GuestUser".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_chat_message_with_reference() {
        // テスト項目: コード参照付きのチャットメッセージがデコードされる
        // given (前提条件):
        let text = json!({
            "type": "chat-message",
            "username": "Bob",
            "text": "Check this out",
            "color": "blue",
            "timestamp": 1700000000000i64,
            "reference": {
                "file": "src/main.ts",
                "startLine": 10,
                "endLine": 15,
                "content": "function test() {}"
            }
        })
        .to_string();

        // when (操作):
        let event = Event::decode(&text).unwrap();

        // then (期待する結果):
        let payload = match event {
            Event::ChatMessage(payload) => payload,
            other => panic!("expected chat-message, got {:?}", other),
        };
        assert_eq!(payload.username, "Bob");
        assert_eq!(payload.color, "blue");
        let reference = payload.reference.unwrap();
        assert_eq!(reference.start_line, 10);
        assert_eq!(reference.end_line, 15);
    }

    #[test]
    fn test_decode_identity_without_session_id() {
        // テスト項目: sessionId を含まない identity もデコードできる
        // given (前提条件):
        let text = r#"{"type":"identity","username":"Test User"}"#;

        // when (操作):
        let event = Event::decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            Event::Identity {
                username: "Test User".to_string(),
                session_id: None,
            }
        );
    }

    #[test]
    fn test_decode_unknown_tag_is_reported() {
        // テスト項目: 未知のタグは UnknownTag エラーになる
        // given (前提条件):
        let text = r#"{"type":"follow-user","sessionId":"a"}"#;

        // when (操作):
        let result = Event::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(EnvelopeError::UnknownTag(tag)) if tag == "follow-user"));
    }

    #[test]
    fn test_decode_missing_tag_is_reported() {
        // テスト項目: タグのないメッセージは MissingTag エラーになる
        // given (前提条件):
        let text = r#"{"username":"alice"}"#;

        // when (操作):
        let result = Event::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(EnvelopeError::MissingTag("type"))));
    }

    #[test]
    fn test_decode_malformed_payload_is_reported() {
        // テスト項目: 既知のタグでもペイロードが不正なら Malformed エラーになる
        // given (前提条件):
        let missing_field = r#"{"type":"user-joined","sessionId":"a"}"#;
        let not_json = "hello";

        // when (操作):
        let result1 = Event::decode(missing_field);
        let result2 = Event::decode(not_json);

        // then (期待する結果):
        assert!(matches!(result1, Err(EnvelopeError::Malformed(_))));
        assert!(matches!(result2, Err(EnvelopeError::Malformed(_))));
    }

    #[test]
    fn test_command_decode_rejects_event_tags() {
        // テスト項目: ホスト側のイベントタグはコマンドとして受け付けない
        // given (前提条件):
        let text = r#"{"command":"user-joined"}"#;

        // when (操作):
        let result = Command::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(EnvelopeError::UnknownTag(_))));
    }
}
