//! Connection struct definition
//!
//! Represents one accepted client session: the socket, the peer address,
//! and a mutable nickname.

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpStream;

use crate::types::ConnId;

/// Connected client information
///
/// Owns the client socket. Dropping a `Connection` closes the socket,
/// which is the only way a connection's handle is ever released.
#[derive(Debug)]
pub struct Connection {
    /// Identifier, doubling as the table slot index
    id: ConnId,
    /// Display name; starts as `user:<id>` until changed with /nick
    nick: String,
    /// Client socket (non-blocking)
    stream: TcpStream,
    /// Peer address, kept for operator logging
    addr: SocketAddr,
}

impl Connection {
    /// Create a connection bound to `id` with the synthesized default nick
    pub fn new(id: ConnId, stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            id,
            nick: format!("user:{}", id),
            stream,
            addr,
        }
    }

    /// Identifier of this connection
    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Current nickname
    pub fn nickname(&self) -> &str {
        &self.nick
    }

    /// Replace the nickname. The old value is released; duplicates across
    /// connections are permitted.
    pub fn set_nickname(&mut self, nick: String) {
        self.nick = nick;
    }

    /// Peer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Best-effort unbuffered send. Relies entirely on the kernel socket
    /// buffer: a short write or a write error is not detected, retried,
    /// or reported.
    pub fn send(&self, text: &str) {
        let _ = self.stream.try_write(text.as_bytes());
    }

    /// Attempt one non-blocking read into `buf`
    pub fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    /// Wait until the socket reports pending input (or EOF)
    pub async fn readable(&self) -> io::Result<()> {
        self.stream.readable().await
    }
}
