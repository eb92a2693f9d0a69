//! ChatServer composition
//!
//! Owns the listening socket and the connection table and drives the
//! readiness loop: accept new clients, read whatever arrived, route each
//! chunk to the command processor or the broadcaster. Everything runs on
//! one task; the readiness wait is the only suspension point.

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::broadcast;
use crate::command;
use crate::dispatcher::{self, Event};
use crate::error::AppError;
use crate::registry::ConnectionTable;
use crate::types::{ConnId, POLL_TIMEOUT, READ_CHUNK};

/// Welcome banner sent to every client right after registration
const WELCOME: &str = "Welcome to Simple Chat! Use /nick <nick> to set your nick.\n";

/// The chat relay server
///
/// An explicitly owned context: several independent servers can coexist in
/// one process, which is also what makes the tests below possible.
pub struct ChatServer {
    listener: TcpListener,
    table: ConnectionTable,
}

impl ChatServer {
    /// Bind the listening socket and set up an empty connection table.
    ///
    /// A bind or listen failure here is fatal and propagates to the caller.
    pub async fn bind(addr: &str, capacity: usize) -> Result<Self, AppError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            table: ConnectionTable::new(capacity),
        })
    }

    /// Address the server is actually listening on
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Drive the readiness loop forever.
    ///
    /// Each iteration waits (bounded) for readiness, then handles every
    /// reported event in order: accepts first, then readable connections
    /// in ascending id order. An empty event set is a timed-out wait and
    /// simply starts the next iteration.
    pub async fn run(mut self) -> Result<(), AppError> {
        info!(
            "chat relay listening on {}",
            self.local_addr().map(|a| a.to_string()).unwrap_or_default()
        );

        loop {
            let events = dispatcher::wait(&self.listener, &self.table, POLL_TIMEOUT).await;
            for event in events {
                match event {
                    Event::Incoming(stream, addr) => self.accept_connection(stream, addr),
                    Event::AcceptError(e) => warn!("accept failed: {}", e),
                    Event::Readable(id) => self.read_client(id),
                }
            }
        }
    }

    /// Register a freshly accepted connection and greet it.
    ///
    /// A full table rejects the client; dropping the stream closes it.
    fn accept_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        // Best effort; chat lines are tiny and latency-sensitive.
        let _ = stream.set_nodelay(true);

        match self.table.register(stream, addr) {
            Ok(id) => {
                if let Some(conn) = self.table.get(id) {
                    conn.send(WELCOME);
                }
                info!("Connected client id={} addr={}", id, addr);
            }
            Err(e) => warn!("rejecting connection from {}: {}", addr, e),
        }
    }

    /// Read one bounded chunk from a ready connection and route it.
    ///
    /// Zero bytes or a read error tears the connection down. Each chunk is
    /// handled as a complete line: a message split across two reads is
    /// relayed as two lines. No reassembly buffer is kept.
    fn read_client(&mut self, id: ConnId) {
        let Some(conn) = self.table.get(id) else {
            return;
        };

        let mut buf = [0u8; READ_CHUNK];
        match conn.try_read(&mut buf) {
            Ok(0) => self.drop_client(id),
            Ok(n) => self.route_chunk(id, &buf[..n]),
            // Spurious readiness; the client stays connected.
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(_) => self.drop_client(id),
        }
    }

    /// Tear down one connection, logging the nickname it held at the end
    fn drop_client(&mut self, id: ConnId) {
        if let Some(conn) = self.table.remove(id) {
            info!("Disconnected client id={}, nick={}", id, conn.nickname());
        }
    }

    /// Route one chunk: commands to the processor, the rest to the chat
    fn route_chunk(&mut self, id: ConnId, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        if text.starts_with('/') {
            command::handle(&mut self.table, id, &text);
        } else {
            let Some(sender) = self.table.get(id) else {
                return;
            };
            // Keep whatever terminator the client sent; nothing is added.
            let msg = format!("{}> {}", sender.nickname(), text);
            info!("{}", msg.trim_end());
            broadcast::broadcast_except(&self.table, Some(id), &msg);
        }
    }
}
