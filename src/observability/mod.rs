//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! cache, transport, startup produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout via the fmt layer
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every log line about a stream carries `node` and `stream_id` fields
//! - Metrics go through the `metrics` facade; without an installed exporter
//!   they are no-ops

pub mod logging;
pub mod metrics;
