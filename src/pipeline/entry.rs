//! Log records and the batches they are flushed in.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::level::Level;

/// A single immutable log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    message: String,
    level: Level,
    timestamp: SystemTime,
}

impl LogEntry {
    /// Capture a record stamped with the current wall-clock time.
    pub fn new(message: impl Into<String>, level: Level) -> Self {
        Self::with_timestamp(message, level, SystemTime::now())
    }

    pub fn with_timestamp(message: impl Into<String>, level: Level, timestamp: SystemTime) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Capture time as milliseconds since the unix epoch.
    pub fn unix_millis(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }

    /// Serializable view used by the structured sinks.
    pub fn record(&self) -> EntryRecord<'_> {
        EntryRecord {
            ts_ms: self.unix_millis(),
            level: self.level,
            message: &self.message,
        }
    }
}

/// Wire shape of an entry: `{"ts_ms":..,"level":"info","message":".."}`.
#[derive(Debug, Serialize)]
pub struct EntryRecord<'a> {
    pub ts_ms: u64,
    pub level: Level,
    pub message: &'a str,
}

/// The unit of delivery: every flush produces exactly one batch.
///
/// Sinks only ever see a shared reference, so a batch cannot change while
/// it is being dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    id: Uuid,
    entries: Vec<LogEntry>,
}

impl Batch {
    pub(crate) fn new(entries: Vec<LogEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entries,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Entries in the order they were logged.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
