//! Registry of module loggers
//!
//! Owned by the application's composition root and passed to whoever needs
//! a logger. Guarantees at most one construction per module name, even when
//! several threads ask for the same name at once.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::builder::LoggerBuilder;
use super::logger::Logger;
use crate::config::LoggerConfig;

/// Factory function type for constructing loggers
///
/// Receives the module name and the config with the module directory
/// already appended to its path.
pub type LoggerFactory = Box<dyn Fn(&str, &LoggerConfig) -> Logger + Send + Sync>;

/// Cache of module loggers keyed by module name
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    factory: LoggerFactory,
}

impl LoggerRegistry {
    /// Registry that builds loggers with `LoggerBuilder`
    pub fn new() -> Self {
        Self::with_factory(Box::new(LoggerBuilder::build))
    }

    /// Registry with a custom construction function
    pub fn with_factory(factory: LoggerFactory) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            factory,
        }
    }

    /// Get the logger for `name`, building it from `config` on first use
    ///
    /// On a hit the config is ignored, even if it differs from the one the
    /// logger was built with. On a miss the logger writes under
    /// `<config.path>/<name>/`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use modlog_core::{LoggerConfig, LoggerRegistry};
    ///
    /// let registry = LoggerRegistry::new();
    /// let config = LoggerConfig::new().with_path("/var/log/app").with_mode("file");
    ///
    /// let orders = registry.get_or_create("orders", &config);
    /// orders.info("order placed", &[]);
    ///
    /// registry.close_all();
    /// ```
    pub fn get_or_create(&self, name: &str, config: &LoggerConfig) -> Arc<Logger> {
        if let Some(logger) = self.loggers.read().get(name) {
            return Arc::clone(logger);
        }

        let mut loggers = self.loggers.write();
        // Another caller may have built it between the two locks
        if let Some(logger) = loggers.get(name) {
            return Arc::clone(logger);
        }

        let logger = Arc::new((self.factory)(name, &config.for_module(name)));
        loggers.insert(name.to_string(), Arc::clone(&logger));
        drop(loggers);

        // Reported only after the lock is released: a global subscriber
        // may itself ask this registry for a logger.
        if let Some(e) = logger.fallback() {
            tracing::warn!(module = name, error = %e, "log file unavailable, falling back to stdout");
        }
        logger
    }

    /// Get an already built logger
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.read().contains_key(name)
    }

    /// List all registered module names
    pub fn names(&self) -> Vec<String> {
        self.loggers.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.loggers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.read().is_empty()
    }

    /// Flush every logger and empty the registry
    ///
    /// Flush errors are ignored. Handles still held by callers keep
    /// working, but the next `get_or_create` builds a fresh logger.
    pub fn close_all(&self) {
        let mut loggers = self.loggers.write();
        for logger in loggers.values() {
            let _ = logger.flush();
        }
        *loggers = HashMap::new();
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.names())
            .finish()
    }
}
