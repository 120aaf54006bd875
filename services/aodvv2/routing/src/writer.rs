//! AODVv2 packet writer.
//!
//! One writer per node. It owns the RFC5444 encode buffers, the message
//! target and both content providers behind a single lock, so at most one
//! RREQ or RREP is being encoded at any time. A send either blocks on the
//! lock or runs to completion; the lock is released on every return path.

use crate::error::{Result, WriterError};
use crate::packet::PacketData;
use crate::protocol::{ADDR_LEN, MAX_HOPCOUNT, MSGTYPE_RREP, MSGTYPE_RREQ};
use crate::provider::{AodvProvider, RrepProvider, RreqProvider};
use crate::seqnum::SeqNumStore;
use crate::target::{MessageTarget, Transport};
use aodv_wire::{MessageWriter, WriterConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Packet writer statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterStats {
    /// Route requests handed to the transport
    pub rreq_sent: u64,
    /// Route replies handed to the transport
    pub rrep_sent: u64,
    /// Bytes handed to the transport
    pub bytes_sent: u64,
    /// Sends that failed while encoding
    pub encode_failures: u64,
    /// Sends the transport rejected
    pub transport_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    rreq_sent: AtomicU64,
    rrep_sent: AtomicU64,
    bytes_sent: AtomicU64,
    encode_failures: AtomicU64,
    transport_failures: AtomicU64,
}

struct WriterState<T> {
    writer: MessageWriter,
    target: MessageTarget<T>,
    rreq: AodvProvider,
    rrep: AodvProvider,
}

/// Shared RREQ/RREP writer
pub struct PacketWriter<T> {
    state: Mutex<WriterState<T>>,
    seqnum: Arc<SeqNumStore>,
    counters: Counters,
}

impl<T: Transport> PacketWriter<T> {
    /// Set up buffers, register both message types and bind `transport`.
    ///
    /// Reply sequence numbers are drawn from `seqnum`.
    pub fn new(transport: T, seqnum: Arc<SeqNumStore>, config: WriterConfig) -> Result<Self> {
        let mut writer = MessageWriter::new(config);
        let rreq = AodvProvider::Rreq(RreqProvider);
        let rrep = AodvProvider::Rrep(RrepProvider::new(seqnum.clone()));

        for provider in [&rreq, &rrep] {
            writer.register_content_provider(provider.msg_type(), provider.addr_tlvs())?;
            writer.register_message(provider.msg_type(), ADDR_LEN)?;
        }

        info!(
            msg_size = config.msg_size,
            addr_tlv_size = config.addr_tlv_size,
            packet_size = config.packet_size,
            "AODVv2 packet writer initialized"
        );

        Ok(Self {
            state: Mutex::new(WriterState {
                writer,
                target: MessageTarget::new(transport),
                rreq,
                rrep,
            }),
            seqnum,
            counters: Counters::default(),
        })
    }

    /// Sequence number store used for replies
    pub fn seqnum(&self) -> &Arc<SeqNumStore> {
        &self.seqnum
    }

    /// Encode an RREQ for `packet_data` and send it to `next_hop`.
    ///
    /// The hop limit is taken from `packet_data.hoplimit`. It is set
    /// explicitly after loading the target so that both send paths spell
    /// out where their hop limit comes from. Returns the number of bytes
    /// handed to the transport.
    pub fn send_rreq(&self, packet_data: &PacketData, next_hop: Ipv6Addr) -> Result<usize> {
        validate(packet_data, next_hop)?;
        debug!(orig = %packet_data.orig_node.addr, targ = %packet_data.targ_node.addr, %next_hop, "send rreq");

        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.target.load(MSGTYPE_RREQ, packet_data, next_hop);
        // RREQ: caller's hop limit
        state.target.packet_data.hoplimit = packet_data.hoplimit;

        let len = self.emit(&state.rreq, &mut state.writer, &mut state.target)?;
        self.counters.rreq_sent.fetch_add(1, Ordering::Relaxed);
        Ok(len)
    }

    /// Encode an RREP for `packet_data` and send it to `next_hop`.
    ///
    /// The hop limit is always [`MAX_HOPCOUNT`], whatever `packet_data`
    /// says. The target sequence number is reserved from the store while
    /// the reply is built and handed back if encoding fails, so replies
    /// from writers sharing one store never carry the same number. Only use
    /// this for replies this node originates.
    pub fn send_rrep(&self, packet_data: &PacketData, next_hop: Ipv6Addr) -> Result<usize> {
        validate(packet_data, next_hop)?;
        debug!(orig = %packet_data.orig_node.addr, targ = %packet_data.targ_node.addr, %next_hop, "send rrep");

        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.target.load(MSGTYPE_RREP, packet_data, next_hop);
        // RREP: always the protocol maximum
        state.target.packet_data.hoplimit = MAX_HOPCOUNT;

        let len = self.emit(&state.rrep, &mut state.writer, &mut state.target)?;
        self.counters.rrep_sent.fetch_add(1, Ordering::Relaxed);
        Ok(len)
    }

    /// Snapshot of the writer counters
    pub fn stats(&self) -> WriterStats {
        WriterStats {
            rreq_sent: self.counters.rreq_sent.load(Ordering::Relaxed),
            rrep_sent: self.counters.rrep_sent.load(Ordering::Relaxed),
            bytes_sent: self.counters.bytes_sent.load(Ordering::Relaxed),
            encode_failures: self.counters.encode_failures.load(Ordering::Relaxed),
            transport_failures: self.counters.transport_failures.load(Ordering::Relaxed),
        }
    }

    // Caller holds the lock.
    fn emit(
        &self,
        provider: &AodvProvider,
        writer: &mut MessageWriter,
        target: &mut MessageTarget<T>,
    ) -> Result<usize> {
        let msg_type = provider.msg_type();

        if let Err(e) = writer.create_message(provider, &*target) {
            writer.discard();
            self.counters.encode_failures.fetch_add(1, Ordering::Relaxed);
            warn!(msg_type = msg_type.0, error = %e, "failed to encode message");
            return Err(WriterError::Encode(e));
        }

        match writer.flush(target) {
            Ok(len) => {
                self.counters.bytes_sent.fetch_add(len as u64, Ordering::Relaxed);
                debug!(msg_type = msg_type.0, len, next_hop = %target.target_addr, "packet sent");
                Ok(len)
            }
            Err(e) => {
                self.counters.transport_failures.fetch_add(1, Ordering::Relaxed);
                Err(WriterError::Transport(e))
            }
        }
    }
}

fn validate(packet_data: &PacketData, next_hop: Ipv6Addr) -> Result<()> {
    if next_hop.is_unspecified() {
        return Err(WriterError::InvalidArgument("next hop address is unspecified"));
    }
    if packet_data.orig_node.addr.is_unspecified() {
        return Err(WriterError::InvalidArgument("originator address is unspecified"));
    }
    if packet_data.targ_node.addr.is_unspecified() {
        return Err(WriterError::InvalidArgument("target address is unspecified"));
    }
    Ok(())
}
