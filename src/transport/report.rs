//! Health message schema carried by the built-in transport.

use serde::{Deserialize, Serialize};

/// Which shard a node is serving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub keyspace: String,
    pub shard: String,
    pub tablet_type: String,
}

/// Point-in-time replication and load statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeStats {
    /// Non-empty when the node considers itself unhealthy.
    pub health_error: String,
    pub seconds_behind_master: u32,
    pub binlog_players_count: i32,
    pub seconds_behind_master_filtered_replication: i64,
    pub cpu_usage: f64,
}

/// One health update streamed by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthReport {
    pub target: Option<Target>,
    pub serving: bool,
    pub tablet_externally_reparented_timestamp: i64,
    pub realtime_stats: RealtimeStats,
}

impl HealthReport {
    /// Serving and reporting no health error.
    pub fn is_healthy(&self) -> bool {
        self.serving && self.realtime_stats.health_error.is_empty()
    }
}
