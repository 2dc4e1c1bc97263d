//! Pending-entry buffer and the size-based flush policy.
//!
//! # Invariants
//! - `pending` only grows between flushes and is emptied in one swap
//! - insertion order is delivery order
//! - an empty buffer never produces a batch
//!
//! The buffer itself is not synchronized; [`Logger`](crate::logger::Logger)
//! keeps it behind a mutex so append and swap never interleave.

use std::mem;

use crate::pipeline::entry::{Batch, LogEntry};

/// Flush threshold used when the configuration does not set one.
pub const DEFAULT_FLUSH_INTERVAL: usize = 10;

/// Decides when accumulated entries must be flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    interval: usize,
}

impl FlushPolicy {
    /// `interval == 0` disables automatic flushing.
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn is_manual(&self) -> bool {
        self.interval == 0
    }

    pub fn should_flush(&self, pending: usize) -> bool {
        !self.is_manual() && pending >= self.interval
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL)
    }
}

/// Ordered sequence of entries waiting to be flushed.
#[derive(Debug, Default)]
pub struct LogBuffer {
    pending: Vec<LogEntry>,
    policy: FlushPolicy,
}

impl LogBuffer {
    pub fn new(policy: FlushPolicy) -> Self {
        Self {
            pending: Vec::new(),
            policy,
        }
    }

    /// Append an entry at the tail.
    ///
    /// Returns the batch to dispatch when this append reached the threshold.
    pub fn append(&mut self, entry: LogEntry) -> Option<Batch> {
        self.push(entry);
        self.take_due()
    }

    /// Append an entry without cutting a batch, even past the threshold.
    pub fn push(&mut self, entry: LogEntry) {
        self.pending.push(entry);
    }

    /// Swap the pending entries out if the policy says they are due.
    pub fn take_due(&mut self) -> Option<Batch> {
        if self.policy.should_flush(self.pending.len()) {
            self.take()
        } else {
            None
        }
    }

    /// Swap the pending entries out for an empty sequence.
    ///
    /// Available regardless of the policy; `None` when nothing is pending.
    pub fn take(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }
        Some(Batch::new(mem::take(&mut self.pending)))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }
}
