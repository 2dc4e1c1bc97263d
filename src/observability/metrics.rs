//! Metrics collection and exposition.
//!
//! # Metrics
//! - `logpipe_entries_total` (counter): entries logged, by level
//! - `logpipe_batches_total` (counter): batches dispatched
//! - `logpipe_batch_size` (histogram): entries per dispatched batch
//! - `logpipe_sink_failures_total` (counter): failed deliveries, by sink
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition is opt-in (`observability.metrics_enabled`)

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::pipeline::Level;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!("logpipe_entries_total", "Entries appended to a log buffer");
    describe_counter!("logpipe_batches_total", "Batches dispatched to sinks");
    describe_histogram!("logpipe_batch_size", "Entries per dispatched batch");
    describe_counter!("logpipe_sink_failures_total", "Batches a sink failed to receive");
}

pub fn record_entry(level: Level) {
    counter!("logpipe_entries_total", "level" => level.name()).increment(1);
}

pub fn record_batch(size: usize) {
    counter!("logpipe_batches_total").increment(1);
    histogram!("logpipe_batch_size").record(size as f64);
}

pub fn record_sink_failure(sink: &str) {
    counter!("logpipe_sink_failures_total", "sink" => sink.to_string()).increment(1);
}
