//! AODVv2 protocol constants and TLV tables.

use aodv_wire::{MsgType, TlvType};
use std::net::Ipv6Addr;

/// Route Request message type
pub const MSGTYPE_RREQ: MsgType = MsgType(10);
/// Route Reply message type
pub const MSGTYPE_RREP: MsgType = MsgType(11);

/// Originator node sequence number address TLV
pub const ADDRTLV_ORIGSEQNUM: u8 = 0;
/// Target node sequence number address TLV
pub const ADDRTLV_TARGSEQNUM: u8 = 1;
/// Route metric address TLV
pub const ADDRTLV_METRIC: u8 = 3;

/// Metric type carried as the metric TLV's type extension (hop count)
pub const DEFAULT_METRIC_TYPE: u8 = 3;

/// Hop limit stamped on every locally generated RREP
pub const MAX_HOPCOUNT: u8 = 250;

/// Width of node addresses in AODVv2 messages
pub const ADDR_LEN: u8 = 16;

/// IANA MANET UDP port
pub const MANET_PORT: u16 = 269;

/// LL-MANET-Routers link-local multicast group (ff02::6d)
pub const LL_MANET_ROUTERS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0x6d);

/// OrigSeqNum TLV descriptor
pub const TLV_ORIGSEQNUM: TlvType = TlvType::new(ADDRTLV_ORIGSEQNUM);
/// TargSeqNum TLV descriptor
pub const TLV_TARGSEQNUM: TlvType = TlvType::new(ADDRTLV_TARGSEQNUM);
/// Metric TLV descriptor
pub const TLV_METRIC: TlvType = TlvType::with_ext(ADDRTLV_METRIC, DEFAULT_METRIC_TYPE);

/// Address TLVs an RREQ may carry
pub const RREQ_ADDR_TLVS: [TlvType; 2] = [TLV_ORIGSEQNUM, TLV_METRIC];

/// Address TLVs an RREP may carry
pub const RREP_ADDR_TLVS: [TlvType; 3] = [TLV_ORIGSEQNUM, TLV_TARGSEQNUM, TLV_METRIC];
