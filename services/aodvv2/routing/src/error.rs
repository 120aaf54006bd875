//! Packet writer errors.

use aodv_wire::WireError;
use thiserror::Error;

/// Transport failures reported by the send capability
#[derive(Error, Debug)]
pub enum TransportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Outgoing queue is full
    #[error("transmit queue full")]
    QueueFull,
    /// Transport has shut down
    #[error("transport closed")]
    Closed,
    /// Transport refused the packet
    #[error("packet rejected: {0}")]
    Rejected(String),
}

/// Errors returned by `send_rreq` / `send_rrep`
#[derive(Error, Debug)]
pub enum WriterError {
    /// Caller passed arguments the writer cannot encode
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Message did not fit or was malformed
    #[error("encoding failed: {0}")]
    Encode(#[from] WireError),
    /// Send capability failed
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

/// Result alias for writer operations
pub type Result<T> = std::result::Result<T, WriterError>;
