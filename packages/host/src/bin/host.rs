//! Development host for Duet webview clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin duet-host
//! cargo run --bin duet-host -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use duet_host::Server;
use duet_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "duet-host")]
#[command(about = "Development host relaying Duet sessions over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let server = Server::new(Arc::new(SystemClock));
    if let Err(e) = server.run(&args.host, args.port).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}
