//! Shared sinks and helpers for the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use logpipe::{Batch, Logger, MemorySink, Sink, SinkError};

/// A sink that fails every delivery and counts attempts.
#[derive(Clone, Default)]
pub struct FailingSink {
    attempts: Arc<AtomicUsize>,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for FailingSink {
    fn receive(&self, _batch: &Batch) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Other("downstream unavailable".into()))
    }
}

/// Logger with a single memory sink named `memory`.
#[allow(dead_code)]
pub fn memory_logger(flush_interval: usize) -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    let logger = Logger::builder()
        .flush_interval(flush_interval)
        .sink("memory", sink.clone())
        .unwrap()
        .build();
    (logger, sink)
}

/// Messages of every received batch, batch by batch.
#[allow(dead_code)]
pub fn batch_messages(sink: &MemorySink) -> Vec<Vec<String>> {
    sink.batches()
        .iter()
        .map(|b| b.iter().map(|e| e.message().to_string()).collect())
        .collect()
}
