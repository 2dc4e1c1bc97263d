//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline and sinks produce:
//!     → tracing events (sink failures, skipped targets, dispatch spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
