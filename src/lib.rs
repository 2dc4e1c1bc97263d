//! Batched log aggregation pipeline.
//!
//! Entries are buffered in memory, cut into batches by a size-based flush
//! policy, and fanned out to pluggable sinks built from configuration.

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod observability;
pub mod pipeline;
pub mod sink;

pub use config::schema::AppConfig;
pub use error::LoggerError;
pub use logger::{get_logger, Logger, LoggerBuilder};
pub use pipeline::{level_name, Batch, DispatchError, Level, LogEntry};
pub use sink::{MemorySink, Sink, SinkError, SinkRegistry};
