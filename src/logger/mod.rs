//! Logger facade.
//!
//! # Lifecycle
//! ```text
//! Created (buffer empty, sinks wired)
//!     → Accumulating (entries pending)
//!     → Flushing (threshold reached or flush() called; transient)
//!     → Accumulating ...
//! ```
//!
//! # Locking
//! `log()` appends under the buffer lock. When the append reaches the
//! threshold, the pending entries are swapped out and numbered, and the
//! buffer lock is released before any sink runs. Producers keep filling the
//! next batch while the current one is delivered, and batches reach every
//! sink in the order they were cut (see `order.rs`). The caller that crossed
//! the threshold pays the whole fan-out; a sink that hangs blocks it.
//!
//! A sink may log through the logger that feeds it. Those entries go to a
//! later batch: they are held while the delivery runs and cut afterwards, on
//! the same thread, if they reached the threshold.

mod global;
mod order;

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::app;
use crate::config::{AppConfig, LogConfig, TargetConfig};
use crate::error::LoggerError;
use crate::observability::metrics;
use crate::pipeline::{Batch, DispatchError, Dispatcher, FlushPolicy, Level, LogBuffer, LogEntry};
use crate::sink::{RegistryError, Sink, SinkRegistry};

use order::DeliveryOrder;

pub use global::get_logger;
#[cfg(any(test, feature = "test-util"))]
pub use global::replace_shared;

/// Buffered, batching logger.
#[derive(Debug)]
pub struct Logger {
    pending: Mutex<Pending>,
    dispatcher: Dispatcher,
    order: DeliveryOrder,
}

/// Buffer plus the number of batches cut from it so far.
#[derive(Debug)]
struct Pending {
    buffer: LogBuffer,
    cut: u64,
}

impl Pending {
    fn cut_due(&mut self) -> Option<(u64, Batch)> {
        let batch = self.buffer.take_due()?;
        Some(self.number(batch))
    }

    fn cut_all(&mut self) -> Option<(u64, Batch)> {
        let batch = self.buffer.take()?;
        Some(self.number(batch))
    }

    fn number(&mut self, batch: Batch) -> (u64, Batch) {
        let ticket = self.cut;
        self.cut += 1;
        (ticket, batch)
    }
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build an independent logger from log settings, resolving sink types
    /// through the process-wide registry.
    ///
    /// Never touches the shared instance returned by [`get_logger`].
    pub fn new_instance(settings: &LogConfig) -> Result<Logger, LoggerError> {
        Self::from_config(settings, SinkRegistry::global())
    }

    /// Build a logger from log settings and an explicit registry.
    pub fn from_config(settings: &LogConfig, registry: &SinkRegistry) -> Result<Logger, LoggerError> {
        let targets = settings.targets.as_ref().ok_or_else(|| {
            LoggerError::InvalidConfiguration("the `targets` table is required".to_string())
        })?;

        Ok(LoggerBuilder::new()
            .flush_interval(settings.flush_interval)
            .targets(targets, registry)?
            .build())
    }

    /// Build a logger from the application config. A missing `[log]` section
    /// yields a logger with the default interval and no sinks.
    pub fn from_app_config(config: &AppConfig, registry: &SinkRegistry) -> Result<Logger, LoggerError> {
        match &config.log {
            Some(settings) => Self::from_config(settings, registry),
            None => Ok(LoggerBuilder::new().build()),
        }
    }

    /// Record a message. Flushes synchronously when the threshold is reached.
    pub fn log(&self, message: impl Into<String>, level: Level) -> Result<(), DispatchError> {
        let message = message.into();
        metrics::record_entry(level);

        let mut pending = self.lock_pending();
        pending.buffer.push(LogEntry::new(message, level));
        if order::is_delivering(self.key()) {
            return Ok(());
        }
        let Some(cut) = pending.cut_due() else {
            return Ok(());
        };
        drop(pending);

        self.deliver(cut).map(|_| ())
    }

    pub fn error(&self, message: impl Into<String>) -> Result<(), DispatchError> {
        self.log(message, Level::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<(), DispatchError> {
        self.log(message, Level::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<(), DispatchError> {
        self.log(message, Level::Info)
    }

    /// Record a trace message, only when the application runs in debug mode.
    pub fn trace(&self, message: impl Into<String>) -> Result<(), DispatchError> {
        if app::is_debug() {
            self.log(message, Level::Trace)
        } else {
            Ok(())
        }
    }

    /// Dispatch everything pending, whatever the flush interval.
    ///
    /// Returns the number of entries dispatched; an empty buffer dispatches
    /// nothing and returns 0. Called from inside one of this logger's sinks
    /// it dispatches nothing either: the pending entries stay for a later
    /// batch.
    pub fn flush(&self) -> Result<usize, DispatchError> {
        if order::is_delivering(self.key()) {
            return Ok(0);
        }
        let Some(cut) = self.lock_pending().cut_all() else {
            return Ok(0);
        };

        self.deliver(cut)
    }

    /// Entries waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.lock_pending().buffer.len()
    }

    pub fn flush_interval(&self) -> usize {
        self.lock_pending().buffer.policy().interval()
    }

    /// Sink names in dispatch order.
    pub fn sink_names(&self) -> Vec<String> {
        self.dispatcher
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Deliver a cut batch, then any entries the sinks logged meanwhile that
    /// are now due. Reports the first failure.
    fn deliver(&self, (ticket, batch): (u64, Batch)) -> Result<usize, DispatchError> {
        let mut delivered = batch.len();
        let mut outcome = self.deliver_in_turn(ticket, &batch);

        loop {
            let held = self.lock_pending().cut_due();
            let Some((ticket, batch)) = held else {
                break;
            };
            delivered += batch.len();
            let next = self.deliver_in_turn(ticket, &batch);
            if outcome.is_ok() {
                outcome = next;
            }
        }

        outcome.map(|()| delivered)
    }

    fn deliver_in_turn(&self, ticket: u64, batch: &Batch) -> Result<(), DispatchError> {
        let _turn = self.order.wait_turn(self.key(), ticket);
        self.dispatcher.dispatch(batch)
    }

    /// Identity of this logger for the per-thread delivery marker.
    fn key(&self) -> usize {
        self as *const Logger as usize
    }

    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .map_or_else(|e| e.into_inner().buffer.len(), |p| p.buffer.len());
        if pending > 0 {
            tracing::debug!(pending, "Logger dropped with unflushed entries");
        }
    }
}

/// Step-by-step construction of a [`Logger`].
#[derive(Debug, Default)]
pub struct LoggerBuilder {
    policy: FlushPolicy,
    dispatcher: Dispatcher,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries accumulated before an automatic flush (0 = manual only).
    pub fn flush_interval(mut self, interval: usize) -> Self {
        self.policy = FlushPolicy::new(interval);
        self
    }

    /// Register a sink under a unique name, after those already registered.
    pub fn sink(mut self, name: impl Into<String>, sink: impl Sink + 'static) -> Result<Self, LoggerError> {
        self.dispatcher.register(name, Box::new(sink))?;
        Ok(self)
    }

    /// Construct and register sinks from target descriptors, in the order
    /// they are declared.
    ///
    /// Descriptors without a type, or with a type the registry does not
    /// know, are skipped.
    pub fn targets(
        mut self,
        targets: &IndexMap<String, TargetConfig>,
        registry: &SinkRegistry,
    ) -> Result<Self, LoggerError> {
        for (name, target) in targets {
            let Some(kind) = target.kind.as_deref() else {
                tracing::warn!(sink = %name, "Log target has no type, skipping");
                continue;
            };

            match registry.create(kind, &target.params) {
                Ok(sink) => {
                    self.dispatcher.register(name.clone(), sink)?;
                    tracing::debug!(sink = %name, kind, "Log target registered");
                }
                Err(RegistryError::UnknownType(kind)) => {
                    tracing::warn!(sink = %name, kind = %kind, "Unknown log target type, skipping");
                }
                Err(RegistryError::Construction { source, .. }) => {
                    return Err(LoggerError::SinkConstruction {
                        name: name.clone(),
                        source,
                    });
                }
            }
        }
        Ok(self)
    }

    pub fn build(self) -> Logger {
        Logger {
            pending: Mutex::new(Pending {
                buffer: LogBuffer::new(self.policy),
                cut: 0,
            }),
            dispatcher: self.dispatcher,
            order: DeliveryOrder::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, SinkError, SinkParams};
    use crate::pipeline::Batch;

    fn messages(sink: &MemorySink) -> Vec<Vec<String>> {
        sink.batches()
            .iter()
            .map(|b| b.iter().map(|e| e.message().to_string()).collect())
            .collect()
    }

    fn memory_registry(sink: &MemorySink) -> SinkRegistry {
        let registry = SinkRegistry::new();
        let shared = sink.clone();
        registry.register("memory", move |_| Ok(Box::new(shared.clone()) as Box<dyn Sink>));
        registry
    }

    #[test]
    fn test_threshold_scenario() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .flush_interval(3)
            .sink("memory", sink.clone())
            .unwrap()
            .build();

        logger.info("a").unwrap();
        logger.error("b").unwrap();
        assert_eq!(sink.batch_count(), 0);
        logger.warning("c").unwrap();

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        let got: Vec<_> = batches[0].iter().map(|e| (e.message(), e.level())).collect();
        assert_eq!(got, [("a", Level::Info), ("b", Level::Error), ("c", Level::Warning)]);
        assert!(batches[0].entries().windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
        assert_eq!(logger.pending_len(), 0);
    }

    #[test]
    fn test_manual_flush_scenario() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .flush_interval(0)
            .sink("memory", sink.clone())
            .unwrap()
            .build();

        for i in 0..5 {
            logger.info(format!("m{}", i)).unwrap();
        }
        assert_eq!(sink.batch_count(), 0);
        assert_eq!(logger.pending_len(), 5);

        assert_eq!(logger.flush().unwrap(), 5);
        assert_eq!(messages(&sink), [["m0", "m1", "m2", "m3", "m4"]]);
    }

    #[test]
    fn test_empty_flush_delivers_nothing() {
        let sink = MemorySink::new();
        let logger = Logger::builder().sink("memory", sink.clone()).unwrap().build();

        assert_eq!(logger.flush().unwrap(), 0);
        logger.info("x").unwrap();
        assert_eq!(logger.flush().unwrap(), 1);
        assert_eq!(logger.flush().unwrap(), 0);
        assert_eq!(sink.batch_count(), 1);
    }

    #[test]
    fn test_flush_every_n() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .flush_interval(4)
            .sink("memory", sink.clone())
            .unwrap()
            .build();

        for i in 0..10 {
            logger.info(i.to_string()).unwrap();
        }

        assert_eq!(
            messages(&sink),
            [["0", "1", "2", "3"], ["4", "5", "6", "7"]]
        );
        assert_eq!(logger.pending_len(), 2);
    }

    #[test]
    fn test_missing_targets_is_invalid() {
        let err = Logger::from_config(&LogConfig::default(), &SinkRegistry::new()).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_missing_log_section_means_no_sinks() {
        let logger = Logger::from_app_config(&AppConfig::default(), &SinkRegistry::new()).unwrap();
        assert!(logger.sink_names().is_empty());
        assert_eq!(logger.flush_interval(), crate::pipeline::DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn test_unresolvable_targets_are_skipped() {
        let sink = MemorySink::new();
        let settings = LogConfig::new(1)
            .target("a-untyped", TargetConfig::default())
            .target("b-unknown", TargetConfig::new("carrier-pigeon"))
            .target("c-memory", TargetConfig::new("memory"));

        let logger = Logger::from_config(&settings, &memory_registry(&sink)).unwrap();
        assert_eq!(logger.sink_names(), ["c-memory"]);

        logger.info("delivered").unwrap();
        assert_eq!(messages(&sink), [["delivered"]]);
    }

    #[test]
    fn test_rejected_parameters_fail_construction() {
        let registry = SinkRegistry::new();
        registry.register("strict", |params: &SinkParams| {
            if params.contains_key("endpoint") {
                Ok(Box::new(MemorySink::new()) as Box<dyn Sink>)
            } else {
                Err(SinkError::invalid_param("endpoint", "required"))
            }
        });

        let settings = LogConfig::new(10).target("remote", TargetConfig::new("strict"));
        let err = Logger::from_config(&settings, &registry).unwrap_err();
        assert!(matches!(err, LoggerError::SinkConstruction { ref name, .. } if name == "remote"));
    }

    #[test]
    fn test_dispatch_order_follows_declaration_order() {
        let order = std::sync::Arc::new(Mutex::new(Vec::new()));
        let registry = SinkRegistry::new();
        let seen = order.clone();
        registry.register("recorder", move |params: &SinkParams| {
            let label = params
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(Box::new(Recorder(label, seen.clone())) as Box<dyn Sink>)
        });

        let settings = LogConfig::new(1)
            .target("zeta", TargetConfig::new("recorder").param("label", "zeta"))
            .target("alpha", TargetConfig::new("recorder").param("label", "alpha"))
            .target("mid", TargetConfig::new("recorder").param("label", "mid"));
        let logger = Logger::from_config(&settings, &registry).unwrap();
        assert_eq!(logger.sink_names(), ["zeta", "alpha", "mid"]);

        logger.info("go").unwrap();
        assert_eq!(*order.lock().unwrap(), ["zeta", "alpha", "mid"]);
    }

    struct Recorder(String, std::sync::Arc<Mutex<Vec<String>>>);

    impl Sink for Recorder {
        fn receive(&self, _batch: &Batch) -> Result<(), SinkError> {
            self.1.lock().unwrap().push(self.0.clone());
            Ok(())
        }
    }

    /// Logs one follow-up entry into its own logger for every batch that
    /// is not made of follow-ups.
    struct Echo(std::sync::Arc<std::sync::OnceLock<std::sync::Weak<Logger>>>);

    impl Sink for Echo {
        fn receive(&self, batch: &Batch) -> Result<(), SinkError> {
            if batch.iter().all(|e| e.message().starts_with("echo:")) {
                return Ok(());
            }
            let logger = self.0.get().and_then(std::sync::Weak::upgrade);
            if let Some(logger) = logger {
                let first = batch.entries()[0].message().to_string();
                logger.info(format!("echo:{}", first)).unwrap();
                assert_eq!(logger.flush().unwrap(), 0);
            }
            Ok(())
        }
    }

    fn echo_logger(interval: usize) -> (std::sync::Arc<Logger>, MemorySink) {
        let slot = std::sync::Arc::new(std::sync::OnceLock::new());
        let sink = MemorySink::new();
        let logger = std::sync::Arc::new(
            Logger::builder()
                .flush_interval(interval)
                .sink("echo", Echo(slot.clone()))
                .unwrap()
                .sink("memory", sink.clone())
                .unwrap()
                .build(),
        );
        slot.set(std::sync::Arc::downgrade(&logger)).unwrap();
        (logger, sink)
    }

    #[test]
    fn test_sink_logging_at_interval_one_goes_to_next_batch() {
        let (logger, sink) = echo_logger(1);

        logger.info("a").unwrap();
        assert_eq!(messages(&sink), [["a"], ["echo:a"]]);

        logger.info("b").unwrap();
        assert_eq!(messages(&sink), [["a"], ["echo:a"], ["b"], ["echo:b"]]);
        assert_eq!(logger.pending_len(), 0);
    }

    #[test]
    fn test_sink_logging_below_threshold_waits_for_next_batch() {
        let (logger, sink) = echo_logger(3);

        for msg in ["a", "b", "c"] {
            logger.info(msg).unwrap();
        }
        assert_eq!(messages(&sink), [["a", "b", "c"]]);
        assert_eq!(logger.pending_len(), 1);

        logger.info("d").unwrap();
        logger.info("e").unwrap();
        assert_eq!(
            messages(&sink),
            [vec!["a", "b", "c"], vec!["echo:a", "d", "e"]]
        );

        logger.info("f").unwrap();
        assert_eq!(logger.flush().unwrap(), 2);
        assert_eq!(messages(&sink)[2], ["echo:echo:a", "f"]);
    }
}
