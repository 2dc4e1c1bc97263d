//! Log aggregation pipeline.
//!
//! # Data Flow
//! ```text
//! Logger::log(message, level)
//!     → entry.rs (LogEntry stamped with wall-clock time)
//!     → buffer.rs (append; flush policy checks the threshold)
//!     → threshold reached or manual flush: pending swapped for empty
//!     → dispatch.rs (Batch fanned out to every sink, in order)
//! ```
//!
//! # Design Decisions
//! - Level is metadata only; nothing is filtered before buffering
//! - The swap happens under the buffer lock, so an entry belongs to
//!   exactly one batch
//! - Dispatch runs on the thread that triggered the flush

pub mod buffer;
pub mod dispatch;
pub mod entry;
pub mod level;

pub use buffer::{FlushPolicy, LogBuffer, DEFAULT_FLUSH_INTERVAL};
pub use dispatch::{DispatchError, Dispatcher, SinkFailure, EVENT_FLUSH};
pub use entry::{Batch, EntryRecord, LogEntry};
pub use level::{level_name, Level, ParseLevelError, UNKNOWN_LEVEL};
