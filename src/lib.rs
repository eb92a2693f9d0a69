//! Line-Oriented TCP Chat Relay Library
//!
//! A learning-oriented chat relay built on tokio: clients connect over
//! plain TCP, send newline-terminated text, and every line is fanned out
//! to all other connected clients.
//!
//! # Features
//! - Single-task readiness multiplexing over all sockets
//! - Fixed-capacity slot-indexed connection table
//! - Nickname changes with `/nick`
//! - Connected-user listing with `/list`
//! - Direct messages with `/dm <nick> <message>`
//! - Timestamped broadcast fan-out
//!
//! # Architecture
//! One task owns everything. Each loop iteration waits (with a bounded
//! ceiling) for the listener or any client socket to become ready, then
//! handles the ready set sequentially:
//! - listener ready: accept, register, send the welcome banner
//! - client ready: one bounded read, routed to the command processor
//!   (lines starting with `/`) or broadcast to everyone else
//!
//! Reads are chunk-as-line: no partial-message reassembly is performed, so
//! a message split across two reads is relayed as two lines. Writes are
//! unbuffered best-effort pushes into the kernel socket buffers.
//!
//! # Example
//! ```ignore
//! use chat_relay::{ChatServer, MAX_CONNECTIONS};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ChatServer::bind("0.0.0.0:7711", MAX_CONNECTIONS).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod command;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use command::Command;
pub use connection::Connection;
pub use dispatcher::Event;
pub use error::AppError;
pub use registry::ConnectionTable;
pub use server::ChatServer;
pub use types::{ConnId, DEFAULT_PORT, MAX_CONNECTIONS};
