//! Error types for the chat relay
//!
//! Defines application-level errors. Uses thiserror for ergonomic
//! error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers fatal startup errors (bind/listen) and the connection table's
/// capacity rejection. Per-connection read failures are not represented
/// here: they tear down exactly one connection and never propagate.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal when raised during startup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection table has no free slot
    #[error("connection table full ({capacity} slots occupied)")]
    CapacityExceeded {
        /// Configured table capacity
        capacity: usize,
    },
}
