//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//!
//! ```toml
//! debug = true
//!
//! [log]
//! flush_interval = 10
//!
//! [log.targets.app]
//! type = "file"
//! path = "logs/app.log"
//! format = "json"
//!
//! [log.targets.console]
//! type = "console"
//! stream = "stderr"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pipeline::DEFAULT_FLUSH_INTERVAL;
use crate::sink::SinkParams;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application debug mode. Enables `trace` logging process-wide.
    pub debug: bool,

    /// Log pipeline settings. Without this section the shared logger
    /// starts with no sinks.
    pub log: Option<LogConfig>,

    /// Diagnostics for the pipeline itself.
    pub observability: ObservabilityConfig,
}

/// Log pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Sink descriptors keyed by sink name. Required; may be empty.
    ///
    /// Sinks are wired in the order they are declared, which is also the
    /// dispatch order.
    pub targets: Option<IndexMap<String, TargetConfig>>,

    /// Entries accumulated before an automatic flush (0 = manual only).
    #[serde(alias = "flushInterval")]
    pub flush_interval: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            targets: None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl LogConfig {
    /// A config with an empty (but present) target table.
    pub fn new(flush_interval: usize) -> Self {
        Self {
            targets: Some(IndexMap::new()),
            flush_interval,
        }
    }

    /// Add or replace a target descriptor.
    pub fn target(mut self, name: impl Into<String>, target: TargetConfig) -> Self {
        self.targets
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), target);
        self
    }
}

/// A sink descriptor: `type` plus sink-specific parameters.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct TargetConfig {
    /// Registered sink type. Descriptors without one are skipped.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Everything else in the descriptor.
    #[serde(flatten)]
    pub params: SinkParams,
}

impl TargetConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            params: SinkParams::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter for the pipeline's own diagnostics (`RUST_LOG` syntax).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "logpipe=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
