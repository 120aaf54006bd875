//! AODVv2 message writing and sequence numbers.
//!
//! This crate turns route discovery records into RFC5444 Route Request and
//! Route Reply messages and hands them to the node's transport. It also owns
//! the node sequence number that stamps locally generated replies.
//!
//! Route discovery logic builds a [`PacketData`] and calls
//! [`PacketWriter::send_rreq`] or [`PacketWriter::send_rrep`]; everything else
//! (providers, target, encode buffers) stays inside the writer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use aodv_routing::{
//!     NodeData, PacketData, PacketWriter, SeqNumStore, TransportError, LL_MANET_ROUTERS,
//! };
//! use aodv_wire::WriterConfig;
//! use std::net::Ipv6Addr;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let seqnum = Arc::new(SeqNumStore::new());
//! let radio = |packet: &[u8], next_hop: Ipv6Addr| -> Result<(), TransportError> {
//!     println!("{} bytes to {}", packet.len(), next_hop);
//!     Ok(())
//! };
//! let writer = PacketWriter::new(radio, seqnum.clone(), WriterConfig::default())?;
//!
//! let me: Ipv6Addr = "2001:db8::1".parse()?;
//! let peer: Ipv6Addr = "2001:db8::2".parse()?;
//! let request = PacketData::new(
//!     NodeData::new(me, seqnum.current(), 0),
//!     NodeData::new(peer, 0, 0),
//!     10,
//! );
//! writer.send_rreq(&request, LL_MANET_ROUTERS)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod packet;
pub mod protocol;
pub mod provider;
pub mod seqnum;
pub mod target;
pub mod writer;

pub use error::{TransportError, WriterError};
pub use packet::{NodeData, PacketData};
pub use protocol::*;
pub use provider::{AodvProvider, RrepProvider, RreqProvider};
pub use seqnum::{compare, is_newer, next_seqnum, SeqNumStore, SEQNUM_INITIAL, SEQNUM_UNKNOWN};
pub use target::{MessageTarget, Transport};
pub use writer::{PacketWriter, WriterStats};
