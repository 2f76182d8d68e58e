//! Terminal front end: renders UI updates as text and reads commands from a prompt.
//!
//! - `dom`: element ids and view rules shared with the webview panel
//! - `command`: parsing of typed lines
//! - `completer`: `@mention` tab completion
//! - `terminal` / `formatter`: text rendering of UI updates
//! - `session` / `runner`: the connection loop and reconnection

pub mod command;
pub mod completer;
pub mod dom;
pub mod formatter;
pub mod reconnect;
pub mod runner;
pub mod session;
pub mod terminal;

pub use runner::run_client;
