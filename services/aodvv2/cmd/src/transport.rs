//! UDP transport for the packet writer.
//!
//! The writer sends from inside its lock and must not block, so the
//! transport only queues the packet on a bounded channel. A background task
//! drains the queue onto the MANET UDP socket.

use aodv_routing::{Transport, TransportError};
use bytes::Bytes;
use std::net::{Ipv6Addr, SocketAddrV6};
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::component_warn;

/// A finished packet waiting for the socket
#[derive(Debug, Clone)]
pub struct OutboundPacket {
    pub bytes: Bytes,
    pub next_hop: Ipv6Addr,
}

/// Queues packets for the UDP sender task
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<OutboundPacket>,
}

/// Create a transport and the receiving end of its queue
pub fn channel(depth: usize) -> (ChannelTransport, mpsc::Receiver<OutboundPacket>) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    (ChannelTransport { tx }, rx)
}

impl Transport for ChannelTransport {
    fn send(&self, packet: &[u8], next_hop: Ipv6Addr) -> Result<(), TransportError> {
        let outbound = OutboundPacket {
            bytes: Bytes::copy_from_slice(packet),
            next_hop,
        };

        self.tx.try_send(outbound).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// Drain the queue onto `socket` until every transport handle is dropped
pub async fn run_udp_sender(
    socket: UdpSocket,
    mut rx: mpsc::Receiver<OutboundPacket>,
    port: u16,
    scope_id: u32,
) {
    while let Some(packet) = rx.recv().await {
        let dest = SocketAddrV6::new(packet.next_hop, port, 0, scope_id);
        match socket.send_to(&packet.bytes, dest).await {
            Ok(n) => debug!(len = n, dest = %dest, "packet sent"),
            Err(e) => component_warn!("udp", "Failed to send packet to {}: {}", dest, e),
        }
    }
    debug!("UDP sender stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_packet() {
        let (transport, mut rx) = channel(4);
        let hop: Ipv6Addr = "ff02::6d".parse().unwrap();

        transport.send(&[0x00, 0x0A], hop).unwrap();

        let packet = rx.recv().await.unwrap();
        assert_eq!(&packet.bytes[..], &[0x00, 0x0A]);
        assert_eq!(packet.next_hop, hop);
    }

    #[tokio::test]
    async fn test_full_queue_is_reported() {
        let (transport, _rx) = channel(1);
        let hop = Ipv6Addr::LOCALHOST;

        transport.send(&[1], hop).unwrap();
        assert!(matches!(transport.send(&[2], hop), Err(TransportError::QueueFull)));
    }

    #[tokio::test]
    async fn test_closed_queue_is_reported() {
        let (transport, rx) = channel(1);
        drop(rx);
        assert!(matches!(
            transport.send(&[1], Ipv6Addr::LOCALHOST),
            Err(TransportError::Closed)
        ));
    }
}
