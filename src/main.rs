//! Line-Oriented TCP Chat Relay - Entry Point
//!
//! Initializes logging, binds the listening socket, and drives the
//! readiness loop until the process is killed.

use std::env;

use tracing_subscriber::EnvFilter;

use chat_relay::{ChatServer, DEFAULT_PORT, MAX_CONNECTIONS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| format!("0.0.0.0:{}", DEFAULT_PORT));

    let server = ChatServer::bind(&addr, MAX_CONNECTIONS).await?;
    server.run().await?;
    Ok(())
}
