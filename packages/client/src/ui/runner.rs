//! Client execution logic with reconnection support.

use std::sync::{Arc, RwLock};

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tokio::sync::{mpsc, oneshot};

use crate::{config::ClientConfig, error::ClientError};

use super::{
    completer::{MentionCompleter, SharedRoster},
    reconnect::{next_attempt, should_attempt_reconnect, should_exit_immediately},
    session::run_client_session,
};

/// Run the client, reconnecting after lost connections.
///
/// Every reconnection is a fresh connection with a fresh handshake.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let roster: SharedRoster = Arc::new(RwLock::new(Vec::new()));
    let mut input_rx = spawn_readline(&config, Arc::clone(&roster)).await?;
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            config.url,
            config.username,
            reconnect_count + 1,
            config.max_reconnect_attempts
        );

        match run_client_session(&config, &mut input_rx, Arc::clone(&roster)).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) if should_exit_immediately(&e) => {
                tracing::error!("{}", e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count = next_attempt(&e, reconnect_count);

                if !should_attempt_reconnect(&e, reconnect_count, config.max_reconnect_attempts) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        config.max_reconnect_attempts
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    config.reconnect_interval.as_secs(),
                    reconnect_count + 1,
                    config.max_reconnect_attempts
                );
                tokio::time::sleep(config.reconnect_interval).await;
            }
        }
    }
}

/// Read lines on a blocking thread (rustyline is synchronous) and forward them
async fn spawn_readline(
    config: &ClientConfig,
    roster: SharedRoster,
) -> Result<mpsc::UnboundedReceiver<String>, ClientError> {
    let prompt = format!("{}> ", config.username);
    let trigger = config.mention_trigger;
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let (ready_tx, ready_rx) = oneshot::channel::<Result<(), ClientError>>();

    std::thread::spawn(move || {
        let rl_config = Config::builder().auto_add_history(true).build();
        let mut rl: Editor<MentionCompleter, DefaultHistory> = match Editor::with_config(rl_config) {
            Ok(rl) => rl,
            Err(e) => {
                ready_tx.send(Err(ClientError::Terminal(e.to_string()))).ok();
                return;
            }
        };
        rl.set_helper(Some(MentionCompleter::new(roster, trigger)));
        ready_tx.send(Ok(())).ok();

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if input_tx.send(line).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    ready_rx
        .await
        .map_err(|_| ClientError::Terminal("readline thread exited".to_string()))??;
    Ok(input_rx)
}
