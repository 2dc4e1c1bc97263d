//! Output sinks.
//!
//! # Data Flow
//! ```text
//! [log.targets.<key>] descriptor { type, ...params }
//!     → registry.rs (type → factory)
//!     → Box<dyn Sink> registered on the Logger under <key>
//!
//! On flush:
//!     dispatcher → Sink::receive(&Batch) for every sink, in order
//! ```
//!
//! # Design Decisions
//! - Sinks are built once per logger and never added or removed afterwards
//! - A sink receives a shared reference; it cannot alter what other sinks see
//! - Errors and panics stay with the sink that produced them

pub mod console;
pub mod file;
pub mod memory;
pub mod registry;
pub mod tracing_sink;

use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;

use crate::pipeline::entry::{Batch, LogEntry};

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use registry::{RegistryError, SinkFactory, SinkRegistry};
pub use tracing_sink::TracingSink;

/// Parameter bag of a target descriptor (everything except `type`).
pub type SinkParams = serde_json::Map<String, serde_json::Value>;

/// A destination for flushed batches.
pub trait Sink: Send + Sync {
    /// Record or forward one batch. Called at most once per batch.
    fn receive(&self, batch: &Batch) -> Result<(), SinkError>;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
        (**self).receive(batch)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
        (**self).receive(batch)
    }
}

/// Failure of a single sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid parameter `{param}`: {reason}")]
    InvalidParam { param: String, reason: String },

    #[error("sink panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

impl SinkError {
    pub fn invalid_param(param: &str, reason: impl Into<String>) -> Self {
        SinkError::InvalidParam {
            param: param.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read an optional string parameter.
pub(crate) fn str_param<'a>(params: &'a SinkParams, key: &str) -> Result<Option<&'a str>, SinkError> {
    match params.get(key) {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(SinkError::invalid_param(
            key,
            format!("expected a string, found {}", other),
        )),
    }
}

/// Line format shared by the console and file sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFormat {
    /// `[level] ts_ms | message`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LineFormat {
    pub(crate) fn from_params(params: &SinkParams) -> Result<Self, SinkError> {
        match str_param(params, "format")? {
            None | Some("text") => Ok(LineFormat::Text),
            Some("json") => Ok(LineFormat::Json),
            Some(other) => Err(SinkError::invalid_param(
                "format",
                format!("unknown format `{}` (expected `text` or `json`)", other),
            )),
        }
    }

    pub(crate) fn write_entry<W: Write>(self, out: &mut W, entry: &LogEntry) -> Result<(), SinkError> {
        match self {
            LineFormat::Text => {
                writeln!(out, "[{}] {} | {}", entry.level(), entry.unix_millis(), entry.message())?;
            }
            LineFormat::Json => {
                serde_json::to_writer(&mut *out, &entry.record())?;
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub(crate) fn write_batch<W: Write>(self, out: &mut W, batch: &Batch) -> Result<(), SinkError> {
        for entry in batch {
            self.write_entry(out, entry)?;
        }
        out.flush()?;
        Ok(())
    }
}
