//! UseCase 層: 受信したエンベロープとローカル操作を状態更新と副作用に変換する
//!
//! - `controller`: 単一のディスパッチ関数 (タグごとの match) と、ローカル操作
//! - `effect`: コントローラが返す副作用 (送信・ハンドシェイク停止・UI 更新)
//! - `handshake`: `ready` の定期再送とキャンセル

mod controller;
mod effect;
mod handshake;

pub use controller::SessionController;
pub use effect::{Effect, KeyOutcome, MentionSuggestions, UiUpdate};
pub use handshake::{DEFAULT_HANDSHAKE_INTERVAL, HandshakeCoordinator};
