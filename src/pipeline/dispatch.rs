//! Batch fan-out to the registered sinks.
//!
//! # Guarantees
//! - Every sink sees the same `&Batch`, in registration order
//! - Delivery is sequential and on the caller's thread
//! - One attempt per sink per batch; no retries
//! - A sink that errors or panics does not stop delivery to the others

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use uuid::Uuid;

use crate::error::LoggerError;
use crate::observability::metrics;
use crate::pipeline::entry::Batch;
use crate::sink::{Sink, SinkError};

/// Name of the flush notification, used as the dispatch span's event field.
pub const EVENT_FLUSH: &str = "flush";

/// A sink that failed to receive a batch.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    pub error: SinkError,
}

/// Aggregate of the per-sink failures of one dispatch.
#[derive(Debug, Error)]
#[error("{} of {attempted} sinks failed to receive batch {batch_id}", .failures.len())]
pub struct DispatchError {
    pub batch_id: Uuid,
    pub attempted: usize,
    pub failures: Vec<SinkFailure>,
}

impl DispatchError {
    /// Names of the failed sinks, in dispatch order.
    pub fn failed_sinks(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.sink.as_str()).collect()
    }
}

struct RegisteredSink {
    name: String,
    sink: Box<dyn Sink>,
}

/// Ordered set of uniquely named sinks.
#[derive(Default)]
pub struct Dispatcher {
    sinks: Vec<RegisteredSink>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sink to the dispatch order. Names must be unique.
    pub fn register(&mut self, name: impl Into<String>, sink: Box<dyn Sink>) -> Result<(), LoggerError> {
        let name = name.into();
        if self.sinks.iter().any(|s| s.name == name) {
            return Err(LoggerError::DuplicateSink(name));
        }
        self.sinks.push(RegisteredSink { name, sink });
        Ok(())
    }

    /// Sink names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name.as_str()).collect()
    }

    /// Deliver `batch` to every sink and collect the failures.
    pub fn dispatch(&self, batch: &Batch) -> Result<(), DispatchError> {
        let span = tracing::debug_span!(
            "dispatch",
            event = EVENT_FLUSH,
            batch_id = %batch.id(),
            entries = batch.len(),
            sinks = self.sinks.len(),
        );
        let _enter = span.enter();

        metrics::record_batch(batch.len());

        let mut failures = Vec::new();
        for registered in &self.sinks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| registered.sink.receive(batch)))
                .unwrap_or_else(|payload| Err(SinkError::Panicked(panic_message(payload.as_ref()))));

            if let Err(error) = outcome {
                tracing::warn!(sink = %registered.name, error = %error, "Sink failed to receive batch");
                metrics::record_sink_failure(&registered.name);
                failures.push(SinkFailure {
                    sink: registered.name.clone(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                batch_id: batch.id(),
                attempted: self.sinks.len(),
                failures,
            })
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("sinks", &self.names()).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
