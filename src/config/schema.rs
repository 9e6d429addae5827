//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the health cache.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HealthCacheConfig {
    /// Stream keep-alive settings.
    pub cache: CacheConfig,

    /// Which transport to dial nodes with.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static node directory.
    pub nodes: Vec<NodeConfig>,
}

/// Health stream cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Close a node's health stream after this many seconds without reads.
    pub keep_alive_secs: u64,
}

impl CacheConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: 300, // 5 minutes
        }
    }
}

/// Transport selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Registered dialer protocol name.
    pub protocol: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            protocol: "tcp".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One entry of the static node directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Cell the node lives in.
    pub cell: String,

    /// Numeric node id, unique within the cell.
    pub uid: u32,

    /// Health stream address (e.g., "10.0.0.5:15999").
    pub address: String,
}
