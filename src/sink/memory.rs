//! In-memory sink that keeps every batch it receives.

use std::sync::{Arc, Mutex, PoisonError};

use crate::pipeline::entry::{Batch, LogEntry};
use crate::sink::{Sink, SinkError};

/// Cloning shares the underlying storage, so a clone handed to a logger
/// can be inspected through the original.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Batch>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the received batches, in arrival order.
    pub fn batches(&self) -> Vec<Batch> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All received entries, flattened across batches.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.batches()
            .into_iter()
            .flat_map(|b| b.entries().to_vec())
            .collect()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Sink for MemorySink {
    fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch.clone());
        Ok(())
    }
}
