//! Configuration handling for the AODVv2 node.
//!
//! This module reads the node configuration from a YAML file and applies
//! environment variable overrides on top.

use anyhow::Result;
use aodv_routing::{MANET_PORT, MAX_HOPCOUNT};
use aodv_wire::WriterConfig;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// AODVv2 node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address this node originates route requests from
    pub node_addr: Ipv6Addr,
    /// UDP port for RFC5444 packets
    pub port: u16,
    /// Interface index used as scope for link-local destinations
    pub interface_index: u32,
    /// Node to discover a route to, if any
    pub request_target: Option<Ipv6Addr>,
    /// Hop limit for originated route requests
    pub hop_limit: u8,
    /// Seconds between route requests
    pub request_interval_secs: u64,
    /// Outgoing packet queue depth
    pub queue_depth: usize,
    /// Encode buffer capacities
    pub writer: WriterConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_addr: Ipv6Addr::LOCALHOST,
            port: MANET_PORT,
            interface_index: 0,
            request_target: None,
            hop_limit: MAX_HOPCOUNT,
            request_interval_secs: 10,
            queue_depth: 16,
            writer: WriterConfig::default(),
        }
    }
}

/// Root configuration structure (matches the YAML structure)
#[derive(Debug, Deserialize)]
struct RootConfig {
    aodvv2: Option<NodeConfig>,
}

impl NodeConfig {
    /// Load configuration from file and environment variables
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config = Self::default();

        if let Ok(content) = std::fs::read_to_string(&config_path) {
            match serde_yaml::from_str::<RootConfig>(&content) {
                Ok(RootConfig { aodvv2: Some(node) }) => {
                    config = node;
                    info!("Loaded configuration from {:?}", config_path.as_ref());
                }
                Ok(RootConfig { aodvv2: None }) => {
                    warn!("No aodvv2 section in {:?}, using defaults", config_path.as_ref());
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}, using defaults", config_path.as_ref(), e);
                }
            }
        } else {
            warn!("Config file {:?} not found, using defaults", config_path.as_ref());
        }

        config.apply_environment_overrides();

        info!(
            "Final node configuration: node_addr={}, port={}, target={:?}, hop_limit={}",
            config.node_addr, config.port, config.request_target, config.hop_limit
        );

        Ok(config)
    }

    /// Interval between route requests
    pub fn request_interval(&self) -> Duration {
        Duration::from_secs(self.request_interval_secs.max(1))
    }

    /// Apply environment variable overrides
    fn apply_environment_overrides(&mut self) {
        if let Ok(addr) = std::env::var("AODV_NODE_ADDR") {
            if let Ok(addr) = addr.parse::<Ipv6Addr>() {
                self.node_addr = addr;
                info!("Node address overridden by environment: {}", addr);
            }
        }

        if let Ok(port) = std::env::var("AODV_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.port = port;
                info!("Port overridden by environment: {}", port);
            }
        }

        if let Ok(target) = std::env::var("AODV_TARGET") {
            if let Ok(target) = target.parse::<Ipv6Addr>() {
                self.request_target = Some(target);
                info!("Request target overridden by environment: {}", target);
            }
        }

        if let Ok(hop_limit) = std::env::var("AODV_HOP_LIMIT") {
            if let Ok(hop_limit) = hop_limit.parse::<u8>() {
                self.hop_limit = hop_limit;
                info!("Hop limit overridden by environment: {}", hop_limit);
            }
        }
    }
}
