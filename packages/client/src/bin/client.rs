//! Duet terminal client with reconnection support.
//!
//! Connects to a Duet host, completes the readiness handshake and then hosts
//! or joins a pair-programming chat session.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval by default).
//! A username already in use is rejected by the host.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin duet-client -- --username Alice --host
//! cargo run --bin duet-client -- -n Bob --join ws://127.0.0.1:3000/ws
//! ```

use std::time::Duration;

use clap::Parser;

use duet_client::config::{AutoAction, ClientConfig, DEFAULT_HOST_URL, MAX_RECONNECT_ATTEMPTS, RECONNECT_INTERVAL_SECS};
use duet_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "duet-client")]
#[command(about = "Pair-programming chat client with host/guest sessions", long_about = None)]
struct Args {
    /// Username shown to other participants (must be unique on the host)
    #[arg(short = 'n', long)]
    username: String,

    /// WebSocket URL of the host process
    #[arg(short = 'u', long, default_value = DEFAULT_HOST_URL)]
    url: String,

    /// Host a session as soon as the handshake completes
    #[arg(long, conflicts_with = "join")]
    host: bool,

    /// Join the session at this address as soon as the handshake completes
    #[arg(long, value_name = "ADDRESS")]
    join: Option<String>,

    /// Interval between `ready` retries in milliseconds
    #[arg(long, default_value_t = 1000)]
    handshake_interval_ms: u64,

    /// Character that opens an @mention
    #[arg(long, default_value_t = '@')]
    mention_trigger: char,

    #[arg(long, default_value_t = MAX_RECONNECT_ATTEMPTS)]
    max_reconnect_attempts: u32,

    #[arg(long, default_value_t = RECONNECT_INTERVAL_SECS)]
    reconnect_interval_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        let auto_action = match (args.host, args.join) {
            (true, _) => Some(AutoAction::StartServer),
            (false, Some(address)) => Some(AutoAction::JoinServer(address)),
            (false, None) => None,
        };
        Self {
            url: args.url,
            username: args.username,
            auto_action,
            handshake_interval: Duration::from_millis(args.handshake_interval_ms),
            mention_trigger: args.mention_trigger,
            max_reconnect_attempts: args.max_reconnect_attempts,
            reconnect_interval: Duration::from_secs(args.reconnect_interval_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the client
    if let Err(e) = duet_client::ui::run_client(ClientConfig::from(args)).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
