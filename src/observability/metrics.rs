//! Metrics collection and exposition.
//!
//! # Metrics
//! - `health_streams_started_total` (counter)
//! - `health_streams_ended_total` (counter): by `outcome`
//!   (idle, closed, resolve, connect, stream, shutdown)
//! - `health_streams_active` (gauge): running streaming tasks
//! - `health_cache_gets_total` (counter): by `outcome`
//!   (ok, cancelled, deadline, or the terminal error kind)

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_stream_started() {
    metrics::counter!("health_streams_started_total").increment(1);
    metrics::gauge!("health_streams_active").increment(1.0);
}

pub fn record_stream_ended(outcome: &'static str) {
    metrics::counter!("health_streams_ended_total", "outcome" => outcome).increment(1);
    metrics::gauge!("health_streams_active").decrement(1.0);
}

pub fn record_get(outcome: &'static str) {
    metrics::counter!("health_cache_gets_total", "outcome" => outcome).increment(1);
}
