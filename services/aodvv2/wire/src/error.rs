//! Wire protocol error types.

use std::fmt;
use thiserror::Error;

/// Identifies which fixed-capacity buffer ran out of room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-message encode buffer
    Message,
    /// Address TLV value arena
    AddrTlv,
    /// Outgoing packet buffer
    Packet,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Message => write!(f, "message"),
            BufferKind::AddrTlv => write!(f, "address tlv"),
            BufferKind::Packet => write!(f, "packet"),
        }
    }
}

/// Wire protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Buffer capacity exceeded
    #[error("{buffer} buffer exhausted: need {needed} bytes, {available} available")]
    Capacity {
        /// Buffer that overflowed
        buffer: BufferKind,
        /// Bytes the write required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Message type was never registered with the writer
    #[error("message type {0} not registered")]
    Unregistered(u8),

    /// Message type registered twice
    #[error("message type {0} already registered")]
    AlreadyRegistered(u8),

    /// Address length outside 1..=16 or not matching the registered width
    #[error("address length {got} invalid (expected {expected})")]
    AddressLength {
        /// Length the message was registered with
        expected: u8,
        /// Length of the offending address
        got: u8,
    },

    /// More addresses than fit in one address block
    #[error("too many addresses")]
    TooManyAddresses,

    /// Address index does not belong to the message being built
    #[error("unknown address index {0}")]
    UnknownAddress(usize),

    /// TLV type not declared in the content provider's table
    #[error("tlv type {0} not declared for this message")]
    UndeclaredTlv(u8),

    /// Same TLV type added twice to one address without allow_dup
    #[error("duplicate tlv type {tlv} on address {addr}")]
    DuplicateTlv {
        /// TLV type
        tlv: u8,
        /// Address index
        addr: usize,
    },

    /// TLV value longer than the extended length field allows
    #[error("tlv value too long: {0}")]
    TlvValueTooLong(usize),

    /// Header flag set without a value for the field
    #[error("message header field missing: {0}")]
    MissingField(&'static str),
}

/// Result alias for wire operations
pub type Result<T> = std::result::Result<T, WireError>;
