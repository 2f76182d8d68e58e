//! One connection's worth of client session.
//!
//! Inbound frames and typed lines are multiplexed with `tokio::select!`; both
//! go through the controller and the resulting effects are executed in order.

use std::sync::Arc;

use duet_shared::time::SystemClock;
use tokio::sync::mpsc;

use crate::{
    config::{AutoAction, ClientConfig},
    domain::{CodeReference, EnvelopeSink},
    error::ClientError,
    infrastructure::transport::WebSocketConnection,
    usecase::{Effect, HandshakeCoordinator, SessionController},
};

use super::{
    command::{InputCommand, parse_line},
    completer::SharedRoster,
    formatter::MessageFormatter,
    terminal::{TerminalView, redisplay_prompt},
};

struct ClientSession<'a> {
    config: &'a ClientConfig,
    sink: Arc<dyn EnvelopeSink>,
    controller: SessionController,
    handshake: HandshakeCoordinator,
    view: TerminalView,
    attachment: Option<CodeReference>,
    auto_action: Option<AutoAction>,
}

/// Run the client session over a fresh connection.
///
/// `Ok(())` means the user quit. `Err(ClientError::ConnectionLost)` means the
/// host went away after connecting and the runner may reconnect.
pub async fn run_client_session(
    config: &ClientConfig,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    roster: SharedRoster,
) -> Result<(), ClientError> {
    let mut connection = WebSocketConnection::connect(&config.connect_url(), &config.username).await?;
    println!(
        "\nYou are '{}'. Type /host to host a session or /join <address> to join one. /quit to exit.\n",
        config.username
    );

    let sink = connection.sink();
    let mut session = ClientSession {
        config,
        sink: Arc::clone(&sink),
        controller: SessionController::new(config.mention_trigger, Arc::new(SystemClock)),
        handshake: HandshakeCoordinator::new(config.handshake_interval),
        view: TerminalView::new(roster),
        attachment: None,
        auto_action: config.auto_action.clone(),
    };
    session.handshake.start(sink);

    loop {
        tokio::select! {
            frame = connection.recv() => {
                let Some(text) = frame else {
                    let effects = session.controller.transport_closed();
                    session.apply(effects).await;
                    return Err(ClientError::ConnectionLost("host closed the connection".to_string()));
                };
                let effects = session.controller.dispatch_text(&text);
                let identified = effects.contains(&Effect::StopHandshake);
                session.apply(effects).await;
                if identified {
                    session.run_auto_action().await;
                }
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    return Ok(());
                };
                if session.handle_line(&line).await {
                    return Ok(());
                }
            }
        }
    }
}

impl ClientSession<'_> {
    /// Execute effects in the order the controller produced them
    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(command) => {
                    if let Err(e) = self.sink.send(command).await {
                        tracing::warn!("Failed to send command: {}", e);
                    }
                }
                Effect::StopHandshake => self.handshake.cancel(),
                Effect::Ui(update) => {
                    if let Some(text) = self.view.render(&update) {
                        self.print(&text);
                    }
                }
            }
        }
    }

    async fn run_auto_action(&mut self) {
        let effects = match self.auto_action.take() {
            Some(AutoAction::StartServer) => self.controller.start_server(),
            Some(AutoAction::JoinServer(address)) => self.controller.join_server(&address),
            None => return,
        };
        self.apply(effects).await;
    }

    /// Handle a typed line. Returns `true` when the user quits.
    async fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(e) => {
                self.print(&MessageFormatter::format_error(&e.to_string()));
                return false;
            }
        };

        let effects = match command {
            InputCommand::Host => self.controller.start_server(),
            InputCommand::Join(address) => self.controller.join_server(&address),
            InputCommand::Approve(session_id) => self.controller.approve(&session_id),
            InputCommand::Reject(session_id) => self.controller.reject(&session_id),
            InputCommand::Attach { file, start, end } => {
                self.attach(&file, start, end).await;
                Vec::new()
            }
            InputCommand::Expand => {
                let text = self.view.toggle_last_code();
                self.print(&text);
                Vec::new()
            }
            InputCommand::Who => {
                let local = self
                    .controller
                    .session()
                    .identity()
                    .map(|identity| identity.username.as_str());
                let text = MessageFormatter::format_participants(
                    self.controller.roster().list_participants(),
                    local,
                );
                self.print(&text);
                Vec::new()
            }
            InputCommand::Quit => return true,
            InputCommand::Chat(text) => {
                let effects = self.controller.submit(&text, self.attachment.as_ref());
                if effects.is_empty() {
                    self.print(&MessageFormatter::format_error(
                        "not in a session yet: /host or /join <address> first",
                    ));
                } else {
                    self.attachment = None;
                }
                effects
            }
        };
        self.apply(effects).await;
        false
    }

    async fn attach(&mut self, file: &str, start: u32, end: u32) {
        let source = match tokio::fs::read_to_string(file).await {
            Ok(source) => source,
            Err(e) => {
                self.print(&MessageFormatter::format_error(&format!(
                    "cannot read {}: {}",
                    file, e
                )));
                return;
            }
        };
        match CodeReference::from_source(file, &source, start, end) {
            Ok(reference) => {
                self.print(&format!(
                    "\nAttached {} from {}; it goes with your next message.\n",
                    reference.label(),
                    file
                ));
                self.attachment = Some(reference);
            }
            Err(e) => self.print(&MessageFormatter::format_error(&e.to_string())),
        }
    }

    fn print(&self, text: &str) {
        print!("{}", text);
        redisplay_prompt(&self.config.username);
    }
}
