//! Append-only file sink.
//!
//! # Design Decisions
//! - File is opened once, at construction, in append mode
//! - Missing parent directories are created
//! - Each batch is written then flushed; no rotation

use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::pipeline::entry::Batch;
use crate::sink::{str_param, LineFormat, Sink, SinkError, SinkParams};

#[derive(Debug)]
pub struct FileSink {
    format: LineFormat,
    out: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>, format: LineFormat) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        tracing::debug!(path = %path.display(), ?format, "File sink opened");
        Ok(Self {
            format,
            out: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Build from `{ path = "...", format = "text" | "json" }`.
    pub fn from_params(params: &SinkParams) -> Result<Self, SinkError> {
        let path = str_param(params, "path")?
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SinkError::invalid_param("path", "a file path is required"))?;
        Self::open(path, LineFormat::from_params(params)?)
    }
}

impl Sink for FileSink {
    fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        self.format.write_batch(&mut *out, batch)
    }
}
