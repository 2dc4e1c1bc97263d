//! Bridges flushed entries into `tracing` events.

use crate::pipeline::entry::Batch;
use crate::pipeline::level::Level;
use crate::sink::{Sink, SinkError};

/// Re-emits each entry under the `logpipe::forward` target, mapping
/// `warning` to `WARN` and the rest one-to-one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
        let batch_id = batch.id();
        for entry in batch {
            let message = entry.message();
            let ts_ms = entry.unix_millis();
            match entry.level() {
                Level::Error => tracing::error!(target: "logpipe::forward", %batch_id, ts_ms, "{}", message),
                Level::Warning => tracing::warn!(target: "logpipe::forward", %batch_id, ts_ms, "{}", message),
                Level::Info => tracing::info!(target: "logpipe::forward", %batch_id, ts_ms, "{}", message),
                Level::Trace => tracing::trace!(target: "logpipe::forward", %batch_id, ts_ms, "{}", message),
            }
        }
        Ok(())
    }
}
