//! Packet and message header encoding.
//!
//! ```text
//! packet:  <version:4><pkt-flags:4> <message>*
//! message: <msg-type:8> <msg-flags:4><msg-addr-length:4> <msg-size:16>
//!          [<msg-orig-addr>] [<msg-hop-limit:8>] [<msg-hop-count:8>] [<msg-seq-num:16>]
//!          <tlv-block> (<addr-block> <tlv-block>)*
//! ```
//!
//! `msg-addr-length` carries the address width minus one, so widths 1..=16 fit.

use crate::buffer::FixedBuf;
use crate::error::{Result, WireError};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// RFC5444 packet version
pub const RFC5444_VERSION: u8 = 0;

/// Widest address a message may carry
pub const MAX_ADDR_LEN: u8 = 16;

/// Message header bytes before the optional fields
pub const MSG_HEADER_FIXED_LEN: usize = 4;

/// Message type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MsgType(pub u8);

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Message header flags (upper nibble of the second header byte)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MsgFlags: u8 {
        /// msg-orig-addr present
        const ORIGINATOR = 0x80;
        /// msg-hop-limit present
        const HOP_LIMIT = 0x40;
        /// msg-hop-count present
        const HOP_COUNT = 0x20;
        /// msg-seq-num present
        const SEQ_NUM = 0x10;
    }
}

/// Fixed-width network address as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetAddr {
    bytes: [u8; MAX_ADDR_LEN as usize],
    len: u8,
}

impl NetAddr {
    /// Build from raw bytes (1..=16 of them)
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > MAX_ADDR_LEN as usize {
            return Err(WireError::AddressLength {
                expected: MAX_ADDR_LEN,
                got: bytes.len().min(u8::MAX as usize) as u8,
            });
        }
        let mut buf = [0u8; MAX_ADDR_LEN as usize];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    /// Address width in bytes
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Always false; a NetAddr holds at least one byte
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl From<Ipv6Addr> for NetAddr {
    fn from(addr: Ipv6Addr) -> Self {
        Self {
            bytes: addr.octets(),
            len: 16,
        }
    }
}

impl From<Ipv4Addr> for NetAddr {
    fn from(addr: Ipv4Addr) -> Self {
        let mut bytes = [0u8; MAX_ADDR_LEN as usize];
        bytes[..4].copy_from_slice(&addr.octets());
        Self { bytes, len: 4 }
    }
}

/// Message header fields set by a content provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgHeader {
    /// Which optional fields are present
    pub flags: MsgFlags,
    /// Originator address
    pub originator: Option<NetAddr>,
    /// Remaining hops
    pub hop_limit: Option<u8>,
    /// Hops traversed
    pub hop_count: Option<u8>,
    /// Message sequence number
    pub seq_num: Option<u16>,
}

impl MsgHeader {
    /// Header with no optional fields
    pub fn new() -> Self {
        Self {
            flags: MsgFlags::empty(),
            originator: None,
            hop_limit: None,
            hop_count: None,
            seq_num: None,
        }
    }

    /// Encode the header, leaving msg-size as zero for the caller to patch
    pub fn encode(&self, msg_type: MsgType, addr_len: u8, buf: &mut FixedBuf) -> Result<()> {
        buf.put_u8(msg_type.0)?;
        buf.put_u8(self.flags.bits() | ((addr_len - 1) & 0x0F))?;
        buf.put_u16(0)?;

        if self.flags.contains(MsgFlags::ORIGINATOR) {
            let orig = self
                .originator
                .ok_or(WireError::MissingField("originator"))?;
            if orig.len() != addr_len {
                return Err(WireError::AddressLength {
                    expected: addr_len,
                    got: orig.len(),
                });
            }
            buf.put_slice(orig.as_bytes())?;
        }
        if self.flags.contains(MsgFlags::HOP_LIMIT) {
            buf.put_u8(self.hop_limit.ok_or(WireError::MissingField("hop-limit"))?)?;
        }
        if self.flags.contains(MsgFlags::HOP_COUNT) {
            buf.put_u8(self.hop_count.ok_or(WireError::MissingField("hop-count"))?)?;
        }
        if self.flags.contains(MsgFlags::SEQ_NUM) {
            buf.put_u16(self.seq_num.ok_or(WireError::MissingField("seq-num"))?)?;
        }
        Ok(())
    }
}

impl Default for MsgHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Packet header byte: version, no packet flags
pub fn packet_header() -> u8 {
    RFC5444_VERSION << 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferKind;

    #[test]
    fn test_hop_limit_only_header() {
        let mut header = MsgHeader::new();
        header.flags = MsgFlags::HOP_LIMIT;
        header.hop_limit = Some(10);

        let mut buf = FixedBuf::new(BufferKind::Message, 16);
        header.encode(MsgType(10), 16, &mut buf).unwrap();

        assert_eq!(buf.as_slice(), &[10, 0x4F, 0x00, 0x00, 10]);
    }

    #[test]
    fn test_all_fields_in_order() {
        let mut header = MsgHeader::new();
        header.flags = MsgFlags::all();
        header.originator = Some(NetAddr::from(Ipv4Addr::new(10, 0, 0, 1)));
        header.hop_limit = Some(3);
        header.hop_count = Some(1);
        header.seq_num = Some(0x0102);

        let mut buf = FixedBuf::new(BufferKind::Message, 32);
        header.encode(MsgType(11), 4, &mut buf).unwrap();

        assert_eq!(
            buf.as_slice(),
            &[11, 0xF3, 0, 0, 10, 0, 0, 1, 3, 1, 0x01, 0x02]
        );
    }

    #[test]
    fn test_flag_without_value_fails() {
        let mut header = MsgHeader::new();
        header.flags = MsgFlags::HOP_LIMIT;

        let mut buf = FixedBuf::new(BufferKind::Message, 16);
        assert_eq!(
            header.encode(MsgType(10), 16, &mut buf),
            Err(WireError::MissingField("hop-limit"))
        );
    }

    #[test]
    fn test_net_addr_widths() {
        let v6 = NetAddr::from("fe80::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(v6.len(), 16);
        assert_eq!(v6.as_bytes()[15], 1);

        assert!(NetAddr::from_slice(&[]).is_err());
        assert!(NetAddr::from_slice(&[0u8; 17]).is_err());
        assert_eq!(NetAddr::from_slice(&[1, 2]).unwrap().len(), 2);
    }

    #[test]
    fn test_packet_header_is_version_zero() {
        assert_eq!(packet_header(), 0x00);
    }
}
