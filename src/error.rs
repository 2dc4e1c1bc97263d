//! Logger construction errors.

use thiserror::Error;

use crate::sink::SinkError;

/// Errors raised while building a [`Logger`](crate::logger::Logger).
///
/// All of them are fatal to the construction attempt; no partially wired
/// logger is ever returned.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The configuration is unusable (e.g. the `targets` table is missing).
    #[error("invalid log configuration: {0}")]
    InvalidConfiguration(String),

    /// A registered sink type rejected its descriptor.
    #[error("failed to construct sink `{name}`: {source}")]
    SinkConstruction {
        name: String,
        #[source]
        source: SinkError,
    },

    /// Two sinks were registered under the same name.
    #[error("sink `{0}` is already registered")]
    DuplicateSink(String),
}
