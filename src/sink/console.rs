//! Standard output / standard error sink.

use std::io;

use crate::pipeline::entry::Batch;
use crate::sink::{str_param, LineFormat, Sink, SinkError, SinkParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Writes each batch to stdout or stderr, holding the stream lock for the
/// whole batch so lines from one batch are never interleaved.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    stream: Stream,
    format: LineFormat,
}

impl ConsoleSink {
    pub fn new(stream: Stream, format: LineFormat) -> Self {
        Self { stream, format }
    }

    /// Build from `{ stream = "stdout" | "stderr", format = "text" | "json" }`.
    pub fn from_params(params: &SinkParams) -> Result<Self, SinkError> {
        let stream = match str_param(params, "stream")? {
            None | Some("stdout") => Stream::Stdout,
            Some("stderr") => Stream::Stderr,
            Some(other) => {
                return Err(SinkError::invalid_param(
                    "stream",
                    format!("unknown stream `{}`", other),
                ))
            }
        };
        Ok(Self::new(stream, LineFormat::from_params(params)?))
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }
}

impl Sink for ConsoleSink {
    fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
        match self.stream {
            Stream::Stdout => self.format.write_batch(&mut io::stdout().lock(), batch),
            Stream::Stderr => self.format.write_batch(&mut io::stderr().lock(), batch),
        }
    }
}
