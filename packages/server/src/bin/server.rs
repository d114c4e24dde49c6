//! WebSocket message relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 127.0.0.1 --port 3000
//! ```

use std::time::Duration;

use clap::Parser;
use hiroba_server::{
    config::{DEFAULT_HOST, DEFAULT_OUTBOUND_BUFFER, DEFAULT_PORT, RelayConfig},
    ui::Server,
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "WebSocket message relay with broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Frames that may wait in each connection's outbound buffer
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER)]
    outbound_buffer: usize,

    /// Milliseconds a recipient may hold up a broadcast before it is evicted
    #[arg(long, default_value_t = 1000)]
    send_timeout_ms: u64,

    /// Keep disconnected clients listed until a send to them fails
    #[arg(long)]
    lazy_eviction: bool,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            outbound_buffer: args.outbound_buffer,
            send_timeout: Duration::from_millis(args.send_timeout_ms),
            leave_on_disconnect: !args.lazy_eviction,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_BIN_NAME"), "tower_http"], "debug");

    let config = RelayConfig::from(Args::parse());
    tracing::debug!("Starting with {:?}", config);

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
