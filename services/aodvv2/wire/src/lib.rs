//! RFC5444 packet writer for the AODVv2 node.
//!
//! This crate provides the generic RFC5444 (packet/message/address-TLV)
//! encoding used to put routing messages on the air. It knows nothing about
//! AODVv2 itself: message contents come from [`ContentProvider`]
//! implementations registered with a [`MessageWriter`], and finished packets
//! go to a [`WriterTarget`].
//!
//! ## Features
//!
//! - **Fixed-capacity buffers**: message, address-TLV and packet buffers are
//!   sized once; overflow is an error, never a reallocation
//! - **Static registration**: message types and their TLV tables are declared
//!   up front and checked on every write
//! - **Deterministic output**: one uncompressed address block per message,
//!   TLVs in table order
//!
//! ## Wire Format
//!
//! ```text
//! +----------------------+----------------------------------+
//! | u8 version/flags     | 0x00                             |
//! +----------------------+----------------------------------+
//! | u8 msg-type          |                                  |
//! | u8 msg-flags/addrlen | orig/hoplimit/hopcount/seqnum    |
//! | u16 msg-size         | whole message                    |
//! | optional fields      | per msg-flags                    |
//! | u16 msg-tlv length   | 0                                |
//! | u8 num-addr, u8 flags| address block, full addresses    |
//! | u16 addr-tlv length  | single-index address TLVs        |
//! +----------------------+----------------------------------+
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod error;
pub mod header;
pub mod tlv;
pub mod writer;

// Re-export main types
pub use buffer::FixedBuf;
pub use error::{BufferKind, WireError};
pub use header::{MsgFlags, MsgHeader, MsgType, NetAddr, MAX_ADDR_LEN, RFC5444_VERSION};
pub use tlv::{TlvFlags, TlvType};
pub use writer::{
    AddrRef, ContentProvider, MessageBuilder, MessageWriter, WriterConfig, WriterTarget,
    DEFAULT_ADDR_TLV_SIZE, DEFAULT_MSG_SIZE, DEFAULT_PACKET_SIZE,
};
