//! Message target: where the writer's packets go.

use crate::error::TransportError;
use crate::packet::PacketData;
use aodv_wire::{MsgType, WriterTarget};
use std::net::Ipv6Addr;
use tracing::warn;

/// Send capability supplied by the transport layer
pub trait Transport: Send + Sync {
    /// Deliver one finished packet to `next_hop`
    fn send(&self, packet: &[u8], next_hop: Ipv6Addr) -> Result<(), TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&[u8], Ipv6Addr) -> Result<(), TransportError> + Send + Sync,
{
    fn send(&self, packet: &[u8], next_hop: Ipv6Addr) -> Result<(), TransportError> {
        self(packet, next_hop)
    }
}

/// State shared by every outgoing message: the record being encoded, the
/// message type being built and the address the packet goes to.
///
/// Lives inside the packet writer's lock and is fully overwritten by each
/// send.
#[derive(Debug)]
pub struct MessageTarget<T> {
    /// Message type being built
    pub msg_type: Option<MsgType>,
    /// Copy of the caller's record
    pub packet_data: PacketData,
    /// Where the flushed packet is sent
    pub target_addr: Ipv6Addr,
    transport: T,
}

impl<T: Transport> MessageTarget<T> {
    /// Bind a transport
    pub fn new(transport: T) -> Self {
        Self {
            msg_type: None,
            packet_data: PacketData::empty(),
            target_addr: Ipv6Addr::UNSPECIFIED,
            transport,
        }
    }

    /// Load the record and destination for the next message
    pub fn load(&mut self, msg_type: MsgType, packet_data: &PacketData, next_hop: Ipv6Addr) {
        self.msg_type = Some(msg_type);
        self.packet_data = *packet_data;
        self.target_addr = next_hop;
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> WriterTarget for MessageTarget<T> {
    type Error = TransportError;

    fn send_packet(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        self.transport
            .send(packet, self.target_addr)
            .inspect_err(|e| warn!(next_hop = %self.target_addr, error = %e, "packet send failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::NodeData;
    use crate::protocol::MSGTYPE_RREQ;
    use std::sync::Mutex;

    #[test]
    fn test_closure_transport_gets_target_addr() {
        let seen = Mutex::new(Vec::new());
        let transport = |packet: &[u8], next_hop: Ipv6Addr| {
            seen.lock().unwrap().push((packet.to_vec(), next_hop));
            Ok::<(), TransportError>(())
        };
        let mut target = MessageTarget::new(&transport);

        let hop: Ipv6Addr = "fe80::9".parse().unwrap();
        let node = NodeData::new("fe80::1".parse().unwrap(), 1, 0);
        target.load(MSGTYPE_RREQ, &PacketData::new(node, node, 3), hop);
        target.send_packet(&[1, 2, 3]).unwrap();

        assert_eq!(target.msg_type, Some(MSGTYPE_RREQ));
        assert_eq!(seen.lock().unwrap().as_slice(), &[(vec![1, 2, 3], hop)]);
    }

    #[test]
    fn test_transport_error_is_returned() {
        let transport =
            |_: &[u8], _: Ipv6Addr| -> Result<(), TransportError> { Err(TransportError::Closed) };
        let mut target = MessageTarget::new(transport);
        assert!(matches!(
            target.send_packet(&[0]),
            Err(TransportError::Closed)
        ));
    }
}
