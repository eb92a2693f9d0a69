//! Fixed-capacity connection table
//!
//! Maps `ConnId` to `Connection` through a slot vector. The slot index IS
//! the identifier: registration takes the lowest free slot, removal frees
//! it for reuse. Iteration is always in ascending id order, which is what
//! fixes broadcast and `/list` ordering.

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::debug;

use crate::connection::Connection;
use crate::error::AppError;
use crate::types::ConnId;

/// Registry of live connections
///
/// Tracks the live count and the highest occupied slot so that iteration
/// never walks the full capacity when only a few low slots are in use.
#[derive(Debug)]
pub struct ConnectionTable {
    /// One slot per admissible id; `None` means free
    slots: Vec<Option<Connection>>,
    /// Number of occupied slots
    live: usize,
    /// Highest occupied slot index, `None` when the table is empty
    max_id: Option<usize>,
}

impl ConnectionTable {
    /// Create an empty table with the given fixed capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            live: 0,
            max_id: None,
        }
    }

    /// Register a freshly accepted connection
    ///
    /// Assigns the lowest free slot and constructs the entry with its
    /// default nickname. Fails with `CapacityExceeded` when every slot is
    /// occupied; the caller drops the stream, which closes it.
    pub fn register(&mut self, stream: TcpStream, addr: SocketAddr) -> Result<ConnId, AppError> {
        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(AppError::CapacityExceeded {
                capacity: self.slots.len(),
            })?;

        let id = ConnId(slot);
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some(Connection::new(id, stream, addr));
        self.live += 1;
        if self.max_id.map_or(true, |max| slot > max) {
            self.max_id = Some(slot);
        }

        debug!("registered connection id={} ({} live)", id, self.live);
        Ok(id)
    }

    /// Remove a connection, returning it so the caller can log its nick.
    ///
    /// Dropping the returned `Connection` closes the socket, exactly once.
    /// When the removed id was the highest live one, the new maximum is
    /// found by scanning downward from it; O(n) worst case is fine at this
    /// capacity.
    pub fn remove(&mut self, id: ConnId) -> Option<Connection> {
        let conn = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        if self.max_id == Some(id.index()) {
            self.max_id = self.slots[..id.index()].iter().rposition(|s| s.is_some());
        }

        debug!("removed connection id={} ({} live)", id, self.live);
        Some(conn)
    }

    /// Look up a live connection by id
    pub fn get(&self, id: ConnId) -> Option<&Connection> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Mutable lookup by id
    pub fn get_mut(&mut self, id: ConnId) -> Option<&mut Connection> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// First connection whose nickname matches exactly, in ascending id
    /// order. Case-sensitive; duplicates resolve to the lowest id.
    pub fn lookup_by_nickname(&self, nick: &str) -> Option<&Connection> {
        self.iter().find(|c| c.nickname() == nick)
    }

    /// Iterate live connections in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        let end = self.max_id.map_or(0, |max| max + 1);
        self.slots[..end].iter().filter_map(|s| s.as_ref())
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when no connection is registered
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Configured slot capacity
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Highest live id, `None` when the table is empty
    pub fn max_id(&self) -> Option<ConnId> {
        self.max_id.map(ConnId)
    }
}
