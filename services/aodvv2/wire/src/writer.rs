//! RFC5444 message writer.
//!
//! The writer owns three fixed-capacity buffers: one for the message being
//! encoded, one arena for address TLV values collected while a content
//! provider runs, and one for the packet that is handed to the target on
//! [`MessageWriter::flush`]. Message types and the TLV table of their
//! content provider are registered once; building a message invokes the
//! provider, encodes the result and appends it to the pending packet.
//!
//! Addresses are emitted in a single uncompressed address block. TLVs are
//! ordered by their position in the provider's table, then by address.

use crate::buffer::FixedBuf;
use crate::error::{BufferKind, Result, WireError};
use crate::header::{packet_header, MsgFlags, MsgHeader, MsgType, NetAddr, MAX_ADDR_LEN};
use crate::tlv::{encode_addr_tlv, TlvType, MAX_TLV_VALUE_LEN};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Default message buffer size in bytes
pub const DEFAULT_MSG_SIZE: usize = 128;
/// Default address TLV arena size in bytes
pub const DEFAULT_ADDR_TLV_SIZE: usize = 1000;
/// Default packet buffer size in bytes
pub const DEFAULT_PACKET_SIZE: usize = 128;

/// Buffer capacities for a [`MessageWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Message buffer size
    pub msg_size: usize,
    /// Address TLV arena size
    pub addr_tlv_size: usize,
    /// Packet buffer size
    pub packet_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            msg_size: DEFAULT_MSG_SIZE,
            addr_tlv_size: DEFAULT_ADDR_TLV_SIZE,
            packet_size: DEFAULT_PACKET_SIZE,
        }
    }
}

/// Policy object that fills in one message type.
///
/// `C` is the caller-owned state the provider reads from while the message
/// is built.
pub trait ContentProvider<C: ?Sized> {
    /// Message type this provider builds
    fn msg_type(&self) -> MsgType;

    /// Set header flags and header fields
    fn add_message_header(&self, ctx: &C, msg: &mut MessageBuilder<'_>) -> Result<()>;

    /// Add addresses and their TLVs
    fn add_addresses(&self, ctx: &C, msg: &mut MessageBuilder<'_>) -> Result<()>;

    /// Called once the message has been encoded into the packet buffer.
    /// Not called when building fails.
    fn finish_message(&self, _ctx: &C) {}

    /// Called instead of [`ContentProvider::finish_message`] when the
    /// message could not be built, so the provider can undo side effects.
    fn abort_message(&self, _ctx: &C) {}
}

/// Destination for finished packets
pub trait WriterTarget {
    /// Error reported by the target
    type Error;

    /// Push one finished packet out
    fn send_packet(&mut self, packet: &[u8]) -> std::result::Result<(), Self::Error>;
}

/// Handle to an address added to the message being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrRef(usize);

impl AddrRef {
    /// Position of the address in the address block
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Registration {
    msg_type: MsgType,
    addr_len: Option<u8>,
    tlvs: Option<SmallVec<[TlvType; 4]>>,
}

#[derive(Debug, Clone, Copy)]
struct Address {
    addr: NetAddr,
    mandatory: bool,
}

#[derive(Debug, Clone, Copy)]
struct AddrTlvEntry {
    tlv_pos: usize,
    addr: usize,
    start: usize,
    len: usize,
}

/// Per-message scratch state, rebuilt from scratch for every message
#[derive(Debug)]
struct MessageState {
    header: MsgHeader,
    addresses: SmallVec<[Address; 4]>,
    tlvs: SmallVec<[AddrTlvEntry; 8]>,
    arena: FixedBuf,
}

impl MessageState {
    fn reset(&mut self) {
        self.header = MsgHeader::new();
        self.addresses.clear();
        self.tlvs.clear();
        self.arena.clear();
    }
}

/// View handed to a content provider while its message is being built
pub struct MessageBuilder<'w> {
    addr_len: u8,
    declared: &'w [TlvType],
    state: &'w mut MessageState,
}

impl<'w> MessageBuilder<'w> {
    /// Select which optional header fields are present
    pub fn set_header(&mut self, flags: MsgFlags) {
        self.state.header.flags = flags;
    }

    /// Set msg-hop-limit
    pub fn set_hop_limit(&mut self, hop_limit: u8) {
        self.state.header.hop_limit = Some(hop_limit);
    }

    /// Set msg-hop-count
    pub fn set_hop_count(&mut self, hop_count: u8) {
        self.state.header.hop_count = Some(hop_count);
    }

    /// Set msg-orig-addr
    pub fn set_originator(&mut self, addr: impl Into<NetAddr>) {
        self.state.header.originator = Some(addr.into());
    }

    /// Set msg-seq-num
    pub fn set_seq_num(&mut self, seq_num: u16) {
        self.state.header.seq_num = Some(seq_num);
    }

    /// Add an address to the address block.
    ///
    /// Adding the same address twice returns the existing handle; the
    /// mandatory mark is sticky.
    pub fn add_address(&mut self, addr: impl Into<NetAddr>, mandatory: bool) -> Result<AddrRef> {
        let addr = addr.into();
        if addr.len() != self.addr_len {
            return Err(WireError::AddressLength {
                expected: self.addr_len,
                got: addr.len(),
            });
        }

        if let Some(pos) = self.state.addresses.iter().position(|a| a.addr == addr) {
            self.state.addresses[pos].mandatory |= mandatory;
            return Ok(AddrRef(pos));
        }

        if self.state.addresses.len() >= u8::MAX as usize {
            return Err(WireError::TooManyAddresses);
        }

        self.state.addresses.push(Address { addr, mandatory });
        Ok(AddrRef(self.state.addresses.len() - 1))
    }

    /// Attach a TLV to an address.
    ///
    /// A second TLV of the same type on the same address is rejected unless
    /// `allow_dup` is set.
    pub fn add_addr_tlv(
        &mut self,
        addr: AddrRef,
        tlv: &TlvType,
        value: &[u8],
        allow_dup: bool,
    ) -> Result<()> {
        let tlv_pos = self
            .declared
            .iter()
            .position(|t| t == tlv)
            .ok_or(WireError::UndeclaredTlv(tlv.kind))?;

        if addr.0 >= self.state.addresses.len() {
            return Err(WireError::UnknownAddress(addr.0));
        }

        if value.len() > MAX_TLV_VALUE_LEN {
            return Err(WireError::TlvValueTooLong(value.len()));
        }

        let duplicate = self
            .state
            .tlvs
            .iter()
            .any(|e| e.tlv_pos == tlv_pos && e.addr == addr.0);
        if duplicate && !allow_dup {
            return Err(WireError::DuplicateTlv {
                tlv: tlv.kind,
                addr: addr.0,
            });
        }

        let start = self.state.arena.len();
        self.state.arena.put_slice(value)?;
        self.state.tlvs.push(AddrTlvEntry {
            tlv_pos,
            addr: addr.0,
            start,
            len: value.len(),
        });
        Ok(())
    }

    /// Number of addresses added so far
    pub fn address_count(&self) -> usize {
        self.state.addresses.len()
    }
}

/// RFC5444 writer with fixed-capacity buffers
#[derive(Debug)]
pub struct MessageWriter {
    config: WriterConfig,
    registry: SmallVec<[Registration; 4]>,
    state: MessageState,
    msg_buf: FixedBuf,
    packet_buf: FixedBuf,
}

impl MessageWriter {
    /// Create a writer, allocating all buffers up front
    pub fn new(config: WriterConfig) -> Self {
        Self {
            config,
            registry: SmallVec::new(),
            state: MessageState {
                header: MsgHeader::new(),
                addresses: SmallVec::new(),
                tlvs: SmallVec::new(),
                arena: FixedBuf::new(BufferKind::AddrTlv, config.addr_tlv_size),
            },
            msg_buf: FixedBuf::new(BufferKind::Message, config.msg_size),
            packet_buf: FixedBuf::new(BufferKind::Packet, config.packet_size),
        }
    }

    /// Buffer capacities
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn entry(&mut self, msg_type: MsgType) -> &mut Registration {
        if let Some(pos) = self.registry.iter().position(|r| r.msg_type == msg_type) {
            return &mut self.registry[pos];
        }
        self.registry.push(Registration {
            msg_type,
            addr_len: None,
            tlvs: None,
        });
        let last = self.registry.len() - 1;
        &mut self.registry[last]
    }

    /// Register a message type and the address width its messages carry
    pub fn register_message(&mut self, msg_type: MsgType, addr_len: u8) -> Result<()> {
        if addr_len == 0 || addr_len > MAX_ADDR_LEN {
            return Err(WireError::AddressLength {
                expected: MAX_ADDR_LEN,
                got: addr_len,
            });
        }
        let entry = self.entry(msg_type);
        if entry.addr_len.is_some() {
            return Err(WireError::AlreadyRegistered(msg_type.0));
        }
        entry.addr_len = Some(addr_len);
        debug!(msg_type = msg_type.0, addr_len, "registered message type");
        Ok(())
    }

    /// Declare the address TLVs a content provider may attach to its message type
    pub fn register_content_provider(&mut self, msg_type: MsgType, tlvs: &[TlvType]) -> Result<()> {
        let entry = self.entry(msg_type);
        if entry.tlvs.is_some() {
            return Err(WireError::AlreadyRegistered(msg_type.0));
        }
        entry.tlvs = Some(tlvs.iter().copied().collect());
        debug!(msg_type = msg_type.0, tlvs = tlvs.len(), "registered content provider");
        Ok(())
    }

    /// Build one message with `provider` and append it to the pending packet.
    ///
    /// On failure nothing is appended and all per-message state is dropped,
    /// so the next message starts clean.
    pub fn create_message<C, P>(&mut self, provider: &P, ctx: &C) -> Result<()>
    where
        C: ?Sized,
        P: ContentProvider<C> + ?Sized,
    {
        let msg_type = provider.msg_type();
        let reg = self
            .registry
            .iter()
            .find(|r| r.msg_type == msg_type)
            .ok_or(WireError::Unregistered(msg_type.0))?;
        let addr_len = reg.addr_len.ok_or(WireError::Unregistered(msg_type.0))?;
        let declared: &[TlvType] = reg.tlvs.as_deref().unwrap_or(&[]);

        self.state.reset();
        let result = build_message(
            msg_type,
            addr_len,
            declared,
            &mut self.state,
            &mut self.msg_buf,
            &mut self.packet_buf,
            provider,
            ctx,
        );
        self.state.reset();
        self.msg_buf.clear();

        match result {
            Ok(()) => {
                provider.finish_message(ctx);
                Ok(())
            }
            Err(e) => {
                debug!(msg_type = msg_type.0, error = %e, "message build failed");
                provider.abort_message(ctx);
                Err(e)
            }
        }
    }

    /// Bytes waiting in the packet buffer
    pub fn pending(&self) -> usize {
        self.packet_buf.len()
    }

    /// Hand the pending packet to `target` and empty the packet buffer.
    ///
    /// Returns the number of bytes sent; an empty packet is not sent.
    pub fn flush<T: WriterTarget + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> std::result::Result<usize, T::Error> {
        if self.packet_buf.is_empty() {
            return Ok(0);
        }
        let len = self.packet_buf.len();
        let result = target.send_packet(self.packet_buf.as_slice());
        self.packet_buf.clear();
        trace!(len, ok = result.is_ok(), "packet flushed");
        result.map(|_| len)
    }

    /// Drop any pending packet without sending it
    pub fn discard(&mut self) {
        self.packet_buf.clear();
    }
}

#[allow(clippy::too_many_arguments)]
fn build_message<C, P>(
    msg_type: MsgType,
    addr_len: u8,
    declared: &[TlvType],
    state: &mut MessageState,
    msg_buf: &mut FixedBuf,
    packet_buf: &mut FixedBuf,
    provider: &P,
    ctx: &C,
) -> Result<()>
where
    C: ?Sized,
    P: ContentProvider<C> + ?Sized,
{
    {
        let mut builder = MessageBuilder {
            addr_len,
            declared,
            state: &mut *state,
        };
        provider.add_message_header(ctx, &mut builder)?;
        provider.add_addresses(ctx, &mut builder)?;
    }

    msg_buf.clear();
    state.header.encode(msg_type, addr_len, msg_buf)?;
    // message TLV block: none
    msg_buf.put_u16(0)?;

    if !state.addresses.is_empty() {
        msg_buf.put_u8(state.addresses.len() as u8)?;
        // no head, no tail
        msg_buf.put_u8(0)?;
        for address in &state.addresses {
            msg_buf.put_slice(address.addr.as_bytes())?;
        }

        let block_start = msg_buf.len();
        msg_buf.put_u16(0)?;
        let mut order: SmallVec<[AddrTlvEntry; 8]> = state.tlvs.clone();
        order.sort_by_key(|e| (e.tlv_pos, e.addr));
        for entry in &order {
            let value = &state.arena.as_slice()[entry.start..entry.start + entry.len];
            encode_addr_tlv(&declared[entry.tlv_pos], entry.addr as u8, value, msg_buf)?;
        }
        let block_len = msg_buf.len() - block_start - 2;
        msg_buf.patch_u16(block_start, length_u16(block_len)?);
    }

    let msg_size = length_u16(msg_buf.len())?;
    msg_buf.patch_u16(2, msg_size);

    let needed = msg_buf.len() + usize::from(packet_buf.is_empty());
    packet_buf.ensure(needed)?;
    if packet_buf.is_empty() {
        packet_buf.put_u8(packet_header())?;
    }
    packet_buf.put_slice(msg_buf.as_slice())?;

    debug!(
        msg_type = msg_type.0,
        addresses = state.addresses.len(),
        mandatory = state.addresses.iter().filter(|a| a.mandatory).count(),
        tlvs = state.tlvs.len(),
        size = msg_size,
        "message created"
    );
    Ok(())
}

fn length_u16(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| WireError::Capacity {
        buffer: BufferKind::Message,
        needed: len,
        available: u16::MAX as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const SEQ: TlvType = TlvType::new(0);
    const METRIC: TlvType = TlvType::with_ext(3, 3);
    const TABLE: [TlvType; 2] = [SEQ, METRIC];

    struct Ctx {
        addrs: Vec<Ipv6Addr>,
        seq_on_last: u16,
        metric_on_first: u8,
        finished: Cell<u32>,
        aborted: Cell<u32>,
    }

    #[derive(Clone, Copy)]
    enum Misuse {
        UndeclaredTlv,
        WrongWidthAddress,
        ForeignAddrRef,
    }

    struct Provider {
        msg_type: MsgType,
        allow_dup: bool,
        tlv_twice: bool,
        misuse: Option<Misuse>,
    }

    impl ContentProvider<Ctx> for Provider {
        fn msg_type(&self) -> MsgType {
            self.msg_type
        }

        fn add_message_header(&self, _ctx: &Ctx, msg: &mut MessageBuilder<'_>) -> Result<()> {
            msg.set_header(MsgFlags::HOP_LIMIT);
            msg.set_hop_limit(5);
            Ok(())
        }

        fn add_addresses(&self, ctx: &Ctx, msg: &mut MessageBuilder<'_>) -> Result<()> {
            let refs = ctx
                .addrs
                .iter()
                .map(|a| msg.add_address(*a, true))
                .collect::<Result<Vec<_>>>()?;
            if let (Some(first), Some(last)) = (refs.first(), refs.last()) {
                // last address first, to check TLV ordering
                msg.add_addr_tlv(*last, &SEQ, &ctx.seq_on_last.to_be_bytes(), false)?;
                msg.add_addr_tlv(*first, &METRIC, &[ctx.metric_on_first], false)?;
                if self.tlv_twice {
                    msg.add_addr_tlv(*first, &METRIC, &[9], self.allow_dup)?;
                }
            }
            match self.misuse {
                Some(Misuse::UndeclaredTlv) => {
                    msg.add_addr_tlv(AddrRef(0), &TlvType::new(7), &[1], false)?;
                }
                Some(Misuse::WrongWidthAddress) => {
                    msg.add_address(Ipv4Addr::new(10, 0, 0, 1), true)?;
                }
                Some(Misuse::ForeignAddrRef) => {
                    // handle from a message with more addresses
                    msg.add_addr_tlv(AddrRef(refs.len()), &SEQ, &[0, 1], false)?;
                }
                None => {}
            }
            Ok(())
        }

        fn finish_message(&self, ctx: &Ctx) {
            ctx.finished.set(ctx.finished.get() + 1);
        }

        fn abort_message(&self, ctx: &Ctx) {
            ctx.aborted.set(ctx.aborted.get() + 1);
        }
    }

    #[derive(Default)]
    struct VecTarget {
        packets: Vec<Vec<u8>>,
        fail: bool,
    }

    impl WriterTarget for VecTarget {
        type Error = &'static str;

        fn send_packet(&mut self, packet: &[u8]) -> std::result::Result<(), Self::Error> {
            if self.fail {
                return Err("link down");
            }
            self.packets.push(packet.to_vec());
            Ok(())
        }
    }

    fn ctx(addrs: &[&str]) -> Ctx {
        Ctx {
            addrs: addrs.iter().map(|a| a.parse().unwrap()).collect(),
            seq_on_last: 0x0102,
            metric_on_first: 4,
            finished: Cell::new(0),
            aborted: Cell::new(0),
        }
    }

    fn writer(config: WriterConfig) -> MessageWriter {
        let mut writer = MessageWriter::new(config);
        writer.register_content_provider(MsgType(10), &TABLE).unwrap();
        writer.register_message(MsgType(10), 16).unwrap();
        writer
    }

    fn provider() -> Provider {
        Provider {
            msg_type: MsgType(10),
            allow_dup: false,
            tlv_twice: false,
            misuse: None,
        }
    }

    fn misusing(misuse: Misuse) -> Provider {
        Provider {
            misuse: Some(misuse),
            ..provider()
        }
    }

    #[test]
    fn test_message_layout() {
        let mut writer = writer(WriterConfig::default());
        let ctx = ctx(&["fe80::1", "fe80::2"]);
        writer.create_message(&provider(), &ctx).unwrap();

        let mut target = VecTarget::default();
        let sent = writer.flush(&mut target).unwrap();
        assert_eq!(sent, 56);

        let a: Ipv6Addr = "fe80::1".parse().unwrap();
        let b: Ipv6Addr = "fe80::2".parse().unwrap();
        let mut expected = vec![0x00, 10, 0x4F, 0x00, 55, 5, 0x00, 0x00, 2, 0x00];
        expected.extend_from_slice(&a.octets());
        expected.extend_from_slice(&b.octets());
        expected.extend_from_slice(&[0x00, 12]);
        // table order: SEQ (on address 1) before METRIC (on address 0)
        expected.extend_from_slice(&[0x00, 0x50, 0x01, 0x02, 0x01, 0x02]);
        expected.extend_from_slice(&[0x03, 0xD0, 0x03, 0x00, 0x01, 0x04]);
        assert_eq!(target.packets, vec![expected]);
        assert_eq!(ctx.finished.get(), 1);
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn test_message_without_addresses() {
        let mut writer = writer(WriterConfig::default());
        writer.create_message(&provider(), &ctx(&[])).unwrap();

        let mut target = VecTarget::default();
        writer.flush(&mut target).unwrap();
        assert_eq!(target.packets[0], vec![0x00, 10, 0x4F, 0x00, 7, 5, 0x00, 0x00]);
    }

    #[test]
    fn test_two_messages_share_one_packet_header() {
        let mut writer = writer(WriterConfig::default());
        writer.create_message(&provider(), &ctx(&[])).unwrap();
        writer.create_message(&provider(), &ctx(&[])).unwrap();
        assert_eq!(writer.pending(), 1 + 7 + 7);
    }

    #[test]
    fn test_unregistered_type() {
        let mut writer = writer(WriterConfig::default());
        let other = Provider {
            msg_type: MsgType(11),
            ..provider()
        };
        assert_eq!(
            writer.create_message(&other, &ctx(&[])),
            Err(WireError::Unregistered(11))
        );
    }

    #[test]
    fn test_double_registration_rejected() {
        let mut writer = writer(WriterConfig::default());
        assert_eq!(
            writer.register_message(MsgType(10), 16),
            Err(WireError::AlreadyRegistered(10))
        );
        assert_eq!(
            writer.register_content_provider(MsgType(10), &TABLE),
            Err(WireError::AlreadyRegistered(10))
        );
        assert!(writer.register_message(MsgType(12), 17).is_err());
    }

    #[test]
    fn test_duplicate_tlv_policy() {
        let mut writer = writer(WriterConfig::default());
        let ctx = ctx(&["fe80::1"]);
        let strict = Provider {
            tlv_twice: true,
            ..provider()
        };
        assert_eq!(
            writer.create_message(&strict, &ctx),
            Err(WireError::DuplicateTlv { tlv: 3, addr: 0 })
        );
        assert_eq!(writer.pending(), 0);
        assert_eq!(ctx.finished.get(), 0);
        assert_eq!(ctx.aborted.get(), 1);

        let lenient = Provider {
            tlv_twice: true,
            allow_dup: true,
            ..provider()
        };
        writer.create_message(&lenient, &ctx).unwrap();
        assert_eq!(ctx.finished.get(), 1);
    }

    #[test]
    fn test_duplicate_address_is_merged() {
        let mut writer = writer(WriterConfig::default());
        writer
            .create_message(&provider(), &ctx(&["fe80::1", "fe80::1"]))
            .unwrap();

        let mut target = VecTarget::default();
        writer.flush(&mut target).unwrap();
        // num-addr
        assert_eq!(target.packets[0][8], 1);
        // 1 + 7 + (2 + 16) + (2 + 6 + 6)
        assert_eq!(target.packets[0].len(), 40);
    }

    #[test]
    fn test_capacity_exhaustion_leaves_packet_untouched() {
        let mut writer = writer(WriterConfig {
            msg_size: 40,
            ..WriterConfig::default()
        });
        let ctx = ctx(&["fe80::1", "fe80::2"]);
        let err = writer.create_message(&provider(), &ctx).unwrap_err();
        assert!(matches!(
            err,
            WireError::Capacity {
                buffer: BufferKind::Message,
                ..
            }
        ));
        assert_eq!(writer.pending(), 0);
        assert_eq!(ctx.finished.get(), 0);

        // the writer is still usable for a message that fits
        writer.create_message(&provider(), &self::ctx(&[])).unwrap();
        assert_eq!(writer.pending(), 8);
    }

    #[test]
    fn test_packet_capacity() {
        let mut writer = writer(WriterConfig {
            packet_size: 50,
            ..WriterConfig::default()
        });
        let err = writer
            .create_message(&provider(), &ctx(&["fe80::1", "fe80::2"]))
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::Capacity {
                buffer: BufferKind::Packet,
                ..
            }
        ));
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn test_tlv_arena_capacity() {
        let mut writer = writer(WriterConfig {
            addr_tlv_size: 2,
            ..WriterConfig::default()
        });
        let err = writer
            .create_message(&provider(), &ctx(&["fe80::1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::Capacity {
                buffer: BufferKind::AddrTlv,
                ..
            }
        ));
    }

    #[test]
    fn test_flush_failure_still_clears_packet() {
        let mut writer = writer(WriterConfig::default());
        writer.create_message(&provider(), &ctx(&[])).unwrap();

        let mut target = VecTarget {
            fail: true,
            ..VecTarget::default()
        };
        assert_eq!(writer.flush(&mut target), Err("link down"));
        assert_eq!(writer.pending(), 0);
        assert_eq!(writer.flush(&mut target), Ok(0));
    }

    #[test]
    fn test_undeclared_tlv_rejected() {
        let mut writer = writer(WriterConfig::default());
        let ctx = ctx(&["fe80::1", "fe80::2"]);
        assert_eq!(
            writer.create_message(&misusing(Misuse::UndeclaredTlv), &ctx),
            Err(WireError::UndeclaredTlv(7))
        );
        assert_eq!(writer.pending(), 0);
        assert_eq!(ctx.finished.get(), 0);
        assert_eq!(ctx.aborted.get(), 1);
    }

    #[test]
    fn test_address_width_must_match_registration() {
        let mut writer = writer(WriterConfig::default());
        let ctx = ctx(&["fe80::1"]);
        assert_eq!(
            writer.create_message(&misusing(Misuse::WrongWidthAddress), &ctx),
            Err(WireError::AddressLength {
                expected: 16,
                got: 4
            })
        );
        assert_eq!(writer.pending(), 0);
        assert_eq!(ctx.finished.get(), 0);
        assert_eq!(ctx.aborted.get(), 1);
    }

    #[test]
    fn test_foreign_addr_ref_rejected() {
        let mut writer = writer(WriterConfig::default());
        let ctx = ctx(&["fe80::1", "fe80::2"]);
        assert_eq!(
            writer.create_message(&misusing(Misuse::ForeignAddrRef), &ctx),
            Err(WireError::UnknownAddress(2))
        );
        assert_eq!(writer.pending(), 0);
        assert_eq!(ctx.finished.get(), 0);
        assert_eq!(ctx.aborted.get(), 1);

        // nothing from the failed message leaks into the next one
        writer.create_message(&provider(), &ctx).unwrap();
        assert_eq!(writer.pending(), 56);
        assert_eq!(ctx.finished.get(), 1);
    }
}
