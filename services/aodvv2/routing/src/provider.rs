//! RREQ and RREP content providers.
//!
//! Both message types share one header layout: hop limit only, no
//! originator, hop count or message sequence number. The hop limit comes from
//! the target's packet data; the send path decides what goes there.
//!
//! Addresses are always (originator, target), both mandatory, and carry no
//! address-type TLV of their own.
//!
//! | message | originator TLVs     | target TLVs           |
//! |---------|---------------------|-----------------------|
//! | RREQ    | OrigSeqNum, Metric  | none                  |
//! | RREP    | OrigSeqNum          | TargSeqNum, Metric    |

use crate::protocol::{
    MSGTYPE_RREP, MSGTYPE_RREQ, RREP_ADDR_TLVS, RREQ_ADDR_TLVS, TLV_METRIC, TLV_ORIGSEQNUM,
    TLV_TARGSEQNUM,
};
use crate::seqnum::SeqNumStore;
use crate::target::MessageTarget;
use aodv_wire::{ContentProvider, MessageBuilder, MsgFlags, MsgType, TlvType, WireError};
use std::cell::Cell;
use std::sync::Arc;
use tracing::debug;

// Duplicate TLVs on one address are a provider bug; refuse them.
const ALLOW_DUP: bool = false;

type WireResult<T> = std::result::Result<T, WireError>;

fn add_message_header<T>(target: &MessageTarget<T>, msg: &mut MessageBuilder<'_>) -> WireResult<()> {
    msg.set_header(MsgFlags::HOP_LIMIT);
    msg.set_hop_limit(target.packet_data.hoplimit);
    Ok(())
}

/// Fills in Route Request messages
#[derive(Debug, Clone, Copy, Default)]
pub struct RreqProvider;

impl RreqProvider {
    fn add_addresses<T>(&self, target: &MessageTarget<T>, msg: &mut MessageBuilder<'_>) -> WireResult<()> {
        let data = &target.packet_data;

        let orig = msg.add_address(data.orig_node.addr, true)?;
        msg.add_address(data.targ_node.addr, true)?;

        msg.add_addr_tlv(orig, &TLV_ORIGSEQNUM, &data.orig_node.seqnum.to_be_bytes(), ALLOW_DUP)?;
        msg.add_addr_tlv(orig, &TLV_METRIC, &[data.orig_node.metric], ALLOW_DUP)?;
        Ok(())
    }
}

/// Fills in Route Reply messages and mints the target sequence number
#[derive(Debug, Clone)]
pub struct RrepProvider {
    seqnum: Arc<SeqNumStore>,
    // number taken for the reply being built
    reserved: Cell<Option<u16>>,
}

impl RrepProvider {
    /// Provider drawing reply sequence numbers from `seqnum`
    pub fn new(seqnum: Arc<SeqNumStore>) -> Self {
        Self {
            seqnum,
            reserved: Cell::new(None),
        }
    }

    fn add_addresses<T>(&self, target: &MessageTarget<T>, msg: &mut MessageBuilder<'_>) -> WireResult<()> {
        let data = &target.packet_data;
        let orig_seqnum = data.orig_node.seqnum;
        // read and advance in one step; other writers may share the store
        let targ_seqnum = self.seqnum.reserve();
        self.reserved.set(Some(targ_seqnum));
        let targ_metric = data.targ_node.metric;

        let orig = msg.add_address(data.orig_node.addr, true)?;
        let targ = msg.add_address(data.targ_node.addr, true)?;

        msg.add_addr_tlv(orig, &TLV_ORIGSEQNUM, &orig_seqnum.to_be_bytes(), ALLOW_DUP)?;
        msg.add_addr_tlv(targ, &TLV_TARGSEQNUM, &targ_seqnum.to_be_bytes(), ALLOW_DUP)?;
        msg.add_addr_tlv(targ, &TLV_METRIC, &[targ_metric], ALLOW_DUP)?;
        Ok(())
    }

    fn finish(&self) {
        if let Some(issued) = self.reserved.take() {
            debug!(issued, "reply sequence number issued");
        }
    }

    // The reply never made it into the packet; hand its number back.
    fn abort(&self) {
        if let Some(issued) = self.reserved.take() {
            let rolled_back = self.seqnum.release(issued);
            debug!(issued, rolled_back, "reply sequence number released");
        }
    }
}

/// The writer's content providers
#[derive(Debug, Clone)]
pub enum AodvProvider {
    /// Route Request
    Rreq(RreqProvider),
    /// Route Reply
    Rrep(RrepProvider),
}

impl AodvProvider {
    /// Message type this provider builds
    pub fn msg_type(&self) -> MsgType {
        match self {
            AodvProvider::Rreq(_) => MSGTYPE_RREQ,
            AodvProvider::Rrep(_) => MSGTYPE_RREP,
        }
    }

    /// Address TLVs this provider declares
    pub fn addr_tlvs(&self) -> &'static [TlvType] {
        match self {
            AodvProvider::Rreq(_) => &RREQ_ADDR_TLVS,
            AodvProvider::Rrep(_) => &RREP_ADDR_TLVS,
        }
    }
}

impl<T> ContentProvider<MessageTarget<T>> for AodvProvider {
    fn msg_type(&self) -> MsgType {
        AodvProvider::msg_type(self)
    }

    fn add_message_header(&self, ctx: &MessageTarget<T>, msg: &mut MessageBuilder<'_>) -> WireResult<()> {
        add_message_header(ctx, msg)
    }

    fn add_addresses(&self, ctx: &MessageTarget<T>, msg: &mut MessageBuilder<'_>) -> WireResult<()> {
        match self {
            AodvProvider::Rreq(p) => p.add_addresses(ctx, msg),
            AodvProvider::Rrep(p) => p.add_addresses(ctx, msg),
        }
    }

    fn finish_message(&self, _ctx: &MessageTarget<T>) {
        if let AodvProvider::Rrep(p) = self {
            p.finish();
        }
    }

    fn abort_message(&self, _ctx: &MessageTarget<T>) {
        if let AodvProvider::Rrep(p) = self {
            p.abort();
        }
    }
}
