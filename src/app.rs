//! Ambient application context.
//!
//! Holds the configuration the shared logger is built from and the
//! process-wide debug flag that gates `trace` logging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::config::AppConfig;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();
static DEBUG: AtomicBool = AtomicBool::new(false);

/// Install the application configuration and adopt its debug flag.
///
/// Only the first call succeeds; later calls hand the config back. Reading
/// [`config`] before installing pins the defaults.
pub fn install(config: AppConfig) -> Result<(), AppConfig> {
    let debug = config.debug;
    CONFIG.set(config)?;
    set_debug(debug);
    Ok(())
}

/// The installed configuration, or the defaults if none was installed.
pub fn config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::default)
}

/// Whether the application runs in debug mode.
pub fn is_debug() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}
