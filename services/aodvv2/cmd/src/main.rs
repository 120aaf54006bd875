//! AODVv2 node binary.
//!
//! Runs the RFC5444 packet writer over the MANET UDP port and periodically
//! originates route requests for a configured target.

use anyhow::Context;
use aodv_routing::{
    NodeData, PacketData, PacketWriter, SeqNumStore, Transport, LL_MANET_ROUTERS, SEQNUM_UNKNOWN,
};
use clap::Parser;
use std::net::{Ipv6Addr, SocketAddrV6};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod logging;
mod transport;

use config::NodeConfig;
use logging::NodeLogFormatter;

/// AODVv2 mesh routing node
#[derive(Parser, Debug)]
#[command(name = "aodvv2", version, about = "AODVv2 route request originator")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "aodvv2.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Node to discover a route to (overrides the configuration file)
    #[arg(long)]
    target: Option<Ipv6Addr>,

    /// Route request interval, e.g. 10s (overrides the configuration file)
    #[arg(long)]
    interval: Option<humantime::Duration>,

    /// Send a single route request and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::new("info")
        .add_directive(format!("aodvv2={}", args.log_level).parse()?)
        .add_directive(format!("aodv_routing={}", args.log_level).parse()?)
        .add_directive(format!("aodv_wire={}", args.log_level).parse()?);

    let formatter = NodeLogFormatter::new("aodvv2".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(true)
        .event_format(formatter)
        .init();

    let mut config = NodeConfig::load_from_file(&args.config)?;
    if let Some(target) = args.target {
        config.request_target = Some(target);
    }
    if let Some(interval) = args.interval {
        config.request_interval_secs = Duration::from(interval).as_secs();
    }

    let target = config
        .request_target
        .context("no request target configured (use --target or request_target)")?;

    let bind = SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, config.port, 0, 0);
    let socket = UdpSocket::bind(bind)
        .await
        .with_context(|| format!("failed to bind UDP socket on {}", bind))?;
    crate::component_info!("udp", "Listening on {}", bind);

    let (transport, rx) = transport::channel(config.queue_depth);
    let sender = tokio::spawn(transport::run_udp_sender(
        socket,
        rx,
        config.port,
        config.interface_index,
    ));

    let seqnum = Arc::new(SeqNumStore::new());
    let writer = PacketWriter::new(transport, seqnum, config.writer)?;

    info!(
        "AODVv2 node {} started, requesting route to {} every {:?}",
        config.node_addr,
        target,
        config.request_interval()
    );

    let mut ticker = tokio::time::interval(config.request_interval());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                request_route(&writer, &config, target);
                if args.once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down");
                break;
            }
        }
    }

    let stats = writer.stats();
    info!(
        "Writer stats: rreq_sent={}, rrep_sent={}, bytes_sent={}, encode_failures={}, transport_failures={}",
        stats.rreq_sent, stats.rrep_sent, stats.bytes_sent, stats.encode_failures, stats.transport_failures
    );

    // Dropping the writer closes the queue; the sender drains what is left.
    drop(writer);
    sender.await.context("UDP sender task failed")?;

    info!("AODVv2 node stopped");
    Ok(())
}

/// Originate one route request for `target` to all MANET routers on the link
fn request_route<T: Transport>(writer: &PacketWriter<T>, config: &NodeConfig, target: Ipv6Addr) {
    let request = PacketData::new(
        NodeData::new(config.node_addr, writer.seqnum().current(), 0),
        NodeData::new(target, SEQNUM_UNKNOWN, 0),
        config.hop_limit,
    );

    match writer.send_rreq(&request, LL_MANET_ROUTERS) {
        Ok(len) => debug!(len, target = %target, "route request queued"),
        Err(e) => crate::component_warn!("discovery", "Route request for {} failed: {}", target, e),
    }
}
