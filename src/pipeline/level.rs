//! Severity levels attached to log entries.
//!
//! Levels are bit-distinct (`1, 2, 4, 8`) but an entry always carries
//! exactly one of them. Level is metadata for sinks; the only gate that
//! looks at it is [`Logger::trace`](crate::logger::Logger::trace).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name reported for any value outside the closed set.
pub const UNKNOWN_LEVEL: &str = "unknown";

/// Severity of a log entry.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error = 1,
    Warning = 2,
    Info = 4,
    Trace = 8,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 4] = [Level::Error, Level::Warning, Level::Info, Level::Trace];

    /// Numeric encoding of the level.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Trace => "trace",
        }
    }

    /// Map a numeric encoding back to a level. Combined bits are not a level.
    pub fn from_bits(bits: u32) -> Option<Level> {
        match bits {
            1 => Some(Level::Error),
            2 => Some(Level::Warning),
            4 => Some(Level::Info),
            8 => Some(Level::Trace),
            _ => None,
        }
    }
}

/// Name of an arbitrary numeric level.
///
/// Total: zero, negative values, combinations and anything else outside
/// the closed set map to [`UNKNOWN_LEVEL`].
pub fn level_name(value: i64) -> &'static str {
    u32::try_from(value)
        .ok()
        .and_then(Level::from_bits)
        .map_or(UNKNOWN_LEVEL, Level::name)
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unrecognized level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Level::Error),
            "warning" | "warn" => Ok(Level::Warning),
            "info" => Ok(Level::Info),
            "trace" => Ok(Level::Trace),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
