//! Process-wide shared logger.
//!
//! Created on first access from the installed application configuration
//! (see [`app::install`](crate::app::install)) and kept for the rest of the
//! process. Creation is double-checked under a lock, so concurrent first
//! callers all observe the same instance.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwapOption;

use crate::app;
use crate::error::LoggerError;
use crate::logger::Logger;
use crate::sink::SinkRegistry;

static INIT: Mutex<()> = Mutex::new(());

fn slot() -> &'static ArcSwapOption<Logger> {
    static SLOT: OnceLock<ArcSwapOption<Logger>> = OnceLock::new();
    SLOT.get_or_init(|| ArcSwapOption::from(None))
}

/// Return the shared logger, creating it on first use.
///
/// A failed creation is not cached; the next call tries again.
pub fn get_logger() -> Result<Arc<Logger>, LoggerError> {
    if let Some(logger) = slot().load_full() {
        return Ok(logger);
    }

    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = slot().load_full() {
        return Ok(logger);
    }

    let logger = Arc::new(Logger::from_app_config(app::config(), SinkRegistry::global())?);
    tracing::debug!(
        sinks = ?logger.sink_names(),
        flush_interval = logger.flush_interval(),
        "Shared logger created"
    );
    slot().store(Some(Arc::clone(&logger)));
    Ok(logger)
}

/// Swap the shared logger for test setup, returning the previous one.
///
/// `None` resets the slot so the next [`get_logger`] builds a fresh instance.
#[cfg(any(test, feature = "test-util"))]
pub fn replace_shared(logger: Option<Arc<Logger>>) -> Option<Arc<Logger>> {
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    slot().swap(logger)
}
