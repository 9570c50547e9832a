//! Room-based WebSocket chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roka-server
//! cargo run --bin roka-server -- --host 127.0.0.1 --port 4000 --allowed-origin http://localhost:3000
//! ```

use clap::Parser;
use roka_server::ui::{Server, ServerConfig};
use roka_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roka-server")]
#[command(about = "Room-based WebSocket chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "4000")]
    port: u16,

    /// Origin allowed to connect (empty accepts any origin)
    #[arg(long, env = "WEB_URI", default_value = "http://localhost:3000")]
    allowed_origin: String,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let allowed_origin = Some(args.allowed_origin.trim().to_string()).filter(|o| !o.is_empty());
        Self {
            host: args.host,
            port: args.port,
            allowed_origin,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    if let Err(e) = Server::in_memory().run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
