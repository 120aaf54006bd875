//! TLV descriptors and address TLV encoding.

use crate::buffer::FixedBuf;
use crate::error::{Result, WireError};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Longest value an extended-length TLV can carry
pub const MAX_TLV_VALUE_LEN: usize = u16::MAX as usize;

bitflags! {
    /// TLV flags octet
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TlvFlags: u8 {
        /// type-ext present
        const HAS_TYPE_EXT = 0x80;
        /// single index-start present
        const SINGLE_INDEX = 0x40;
        /// index-start and index-stop present
        const MULTI_INDEX = 0x20;
        /// length and value present
        const HAS_VALUE = 0x10;
        /// length is two octets
        const EXT_LEN = 0x08;
        /// value is split across the indexed addresses
        const MULTI_VALUE = 0x04;
    }
}

/// A (type, type-extension) pair declared by a content provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TlvType {
    /// TLV type
    pub kind: u8,
    /// Optional type extension
    pub ext: Option<u8>,
}

impl TlvType {
    /// TLV type without extension
    pub const fn new(kind: u8) -> Self {
        Self { kind, ext: None }
    }

    /// TLV type with extension
    pub const fn with_ext(kind: u8, ext: u8) -> Self {
        Self {
            kind,
            ext: Some(ext),
        }
    }
}

/// Encoded size of one single-index address TLV
pub fn addr_tlv_size(tlv: &TlvType, value_len: usize) -> usize {
    let mut size = 2; // type + flags
    if tlv.ext.is_some() {
        size += 1;
    }
    size += 1; // index-start
    size += if value_len > u8::MAX as usize { 2 } else { 1 };
    size + value_len
}

/// Write one address TLV that applies to the address at `index`
pub fn encode_addr_tlv(tlv: &TlvType, index: u8, value: &[u8], buf: &mut FixedBuf) -> Result<()> {
    if value.len() > MAX_TLV_VALUE_LEN {
        return Err(WireError::TlvValueTooLong(value.len()));
    }

    let mut flags = TlvFlags::SINGLE_INDEX | TlvFlags::HAS_VALUE;
    if tlv.ext.is_some() {
        flags |= TlvFlags::HAS_TYPE_EXT;
    }
    if value.len() > u8::MAX as usize {
        flags |= TlvFlags::EXT_LEN;
    }

    buf.ensure(addr_tlv_size(tlv, value.len()))?;
    buf.put_u8(tlv.kind)?;
    buf.put_u8(flags.bits())?;
    if let Some(ext) = tlv.ext {
        buf.put_u8(ext)?;
    }
    buf.put_u8(index)?;
    if flags.contains(TlvFlags::EXT_LEN) {
        buf.put_u16(value.len() as u16)?;
    } else {
        buf.put_u8(value.len() as u8)?;
    }
    buf.put_slice(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferKind;

    #[test]
    fn test_plain_tlv() {
        let mut buf = FixedBuf::new(BufferKind::Message, 16);
        encode_addr_tlv(&TlvType::new(0), 0, &[0x00, 0x05], &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0x00, 0x50, 0x00, 0x02, 0x00, 0x05]);
    }

    #[test]
    fn test_tlv_with_type_ext() {
        let mut buf = FixedBuf::new(BufferKind::Message, 16);
        encode_addr_tlv(&TlvType::with_ext(3, 3), 1, &[7], &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0x03, 0xD0, 0x03, 0x01, 0x01, 0x07]);
    }

    #[test]
    fn test_extended_length() {
        let value = vec![0xAA; 300];
        let tlv = TlvType::new(9);
        let mut buf = FixedBuf::new(BufferKind::Message, 512);
        encode_addr_tlv(&tlv, 0, &value, &mut buf).unwrap();

        assert_eq!(buf.len(), addr_tlv_size(&tlv, 300));
        assert_eq!(&buf.as_slice()[..5], &[9, 0x58, 0, 0x01, 0x2C]);
    }

    #[test]
    fn test_no_partial_tlv_on_overflow() {
        let mut buf = FixedBuf::new(BufferKind::Message, 4);
        assert!(encode_addr_tlv(&TlvType::new(0), 0, &[1, 2], &mut buf).is_err());
        assert!(buf.is_empty());
    }
}
