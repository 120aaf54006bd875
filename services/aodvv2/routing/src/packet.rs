//! Route discovery records handed to the packet writer.

use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

/// Per-node fields of a route request or reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    /// Node address
    pub addr: Ipv6Addr,
    /// Node sequence number
    pub seqnum: u16,
    /// Route cost to the node
    pub metric: u8,
}

impl NodeData {
    /// Create node data
    pub fn new(addr: Ipv6Addr, seqnum: u16, metric: u8) -> Self {
        Self {
            addr,
            seqnum,
            metric,
        }
    }
}

/// Everything needed to encode one RREQ or RREP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketData {
    /// Originator of the route request
    pub orig_node: NodeData,
    /// Target of the route request
    pub targ_node: NodeData,
    /// Remaining hops
    pub hoplimit: u8,
}

impl PacketData {
    /// Create packet data
    pub fn new(orig_node: NodeData, targ_node: NodeData, hoplimit: u8) -> Self {
        Self {
            orig_node,
            targ_node,
            hoplimit,
        }
    }

    /// Placeholder used before the first send
    pub(crate) fn empty() -> Self {
        let node = NodeData::new(Ipv6Addr::UNSPECIFIED, 0, 0);
        Self::new(node, node, 0)
    }
}
