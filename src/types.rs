//! Basic type definitions for the chat relay
//!
//! Provides the `ConnId` newtype plus the protocol constants shared
//! across the dispatcher, command processor, and broadcaster.

use std::time::Duration;

/// Connection identifier (newtype pattern)
///
/// Wraps the slot index the connection occupies in the `ConnectionTable`.
/// Ids are assigned at registration (lowest free slot), stay unique while
/// the connection is open, and become reusable once it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnId(pub usize);

impl ConnId {
    /// Slot index this id refers to
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default TCP port the relay listens on
pub const DEFAULT_PORT: u16 = 7711;

/// Maximum number of simultaneously connected clients
pub const MAX_CONNECTIONS: usize = 1000;

/// Upper bound on one read chunk; each chunk is processed as a full line
pub const READ_CHUNK: usize = 255;

/// Maximum outbound line length; longer broadcasts are silently truncated
pub const MAX_LINE: usize = 255;

/// Ceiling on one readiness wait. A wait that expires with nothing ready
/// is a no-op iteration, reserved for periodic work.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);
