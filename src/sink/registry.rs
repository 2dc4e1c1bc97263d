//! Sink type registry.
//!
//! Maps the `type` of a target descriptor to a factory that builds the sink
//! from the rest of the descriptor. Types are registered up front; there is
//! no name-based lookup beyond this table.

use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use thiserror::Error;

use crate::sink::{ConsoleSink, FileSink, Sink, SinkError, SinkParams, TracingSink};

/// Builds a sink from a descriptor's parameter bag.
pub type SinkFactory = Arc<dyn Fn(&SinkParams) -> Result<Box<dyn Sink>, SinkError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// No factory is registered for the requested type.
    #[error("no sink type registered under `{0}`")]
    UnknownType(String),

    /// The factory rejected the descriptor.
    #[error("failed to construct `{kind}` sink: {source}")]
    Construction {
        kind: String,
        #[source]
        source: SinkError,
    },
}

#[derive(Default)]
pub struct SinkRegistry {
    factories: DashMap<String, SinkFactory>,
}

impl SinkRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the `console`, `file` and `tracing` sink types.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("console", |params| {
            Ok(Box::new(ConsoleSink::from_params(params)?) as Box<dyn Sink>)
        });
        registry.register("file", |params| {
            Ok(Box::new(FileSink::from_params(params)?) as Box<dyn Sink>)
        });
        registry.register("tracing", |_| Ok(Box::new(TracingSink) as Box<dyn Sink>));
        registry
    }

    /// Process-wide registry used by [`get_logger`](crate::logger::get_logger).
    pub fn global() -> &'static SinkRegistry {
        static GLOBAL: OnceLock<SinkRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SinkRegistry::with_builtins)
    }

    /// Register a factory, returning the one it replaced.
    pub fn register<F>(&self, kind: impl Into<String>, factory: F) -> Option<SinkFactory>
    where
        F: Fn(&SinkParams) -> Result<Box<dyn Sink>, SinkError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        tracing::debug!(kind = %kind, "Sink type registered");
        self.factories.insert(kind, Arc::new(factory))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered type names, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.factories.iter().map(|r| r.key().clone()).collect();
        kinds.sort();
        kinds
    }

    /// Build a sink of the given type.
    pub fn create(&self, kind: &str, params: &SinkParams) -> Result<Box<dyn Sink>, RegistryError> {
        // Clone the factory out so the map shard is not locked while it runs.
        let factory = self
            .factories
            .get(kind)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| RegistryError::UnknownType(kind.to_string()))?;

        factory(params).map_err(|source| RegistryError::Construction {
            kind: kind.to_string(),
            source,
        })
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_builtins() {
        let registry = SinkRegistry::with_builtins();
        assert_eq!(registry.kinds(), ["console", "file", "tracing"]);
        assert!(registry.create("tracing", &SinkParams::new()).is_ok());
    }

    #[test]
    fn test_unknown_type() {
        let registry = SinkRegistry::new();
        let err = registry.create("syslog", &SinkParams::new()).err().unwrap();
        assert!(matches!(err, RegistryError::UnknownType(ref k) if k == "syslog"));
    }

    #[test]
    fn test_construction_error_keeps_kind() {
        let registry = SinkRegistry::with_builtins();
        let err = registry.create("file", &SinkParams::new()).err().unwrap();
        match err {
            RegistryError::Construction { kind, source } => {
                assert_eq!(kind, "file");
                assert!(matches!(source, SinkError::InvalidParam { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_register_replaces() {
        let registry = SinkRegistry::new();
        assert!(registry.register("memory", |_| Ok(Box::new(MemorySink::new()) as Box<dyn Sink>)).is_none());
        assert!(registry.register("memory", |_| Ok(Box::new(MemorySink::new()) as Box<dyn Sink>)).is_some());
        assert_eq!(registry.kinds(), ["memory"]);
    }
}
