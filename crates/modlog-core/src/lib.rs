//! modlog core
//!
//! A per-module logger factory. Ask a `LoggerRegistry` for the logger of a
//! module and get back a cached structured logger writing either to stdout
//! or to a daily rotating file under `<path>/<module>/`.
//!
//! ```rust,no_run
//! use modlog_core::{Field, LoggerConfig, LoggerRegistry};
//!
//! let registry = LoggerRegistry::new();
//! let config = LoggerConfig::new()
//!     .with_path("/var/log/shop")
//!     .with_mode("file")
//!     .with_keep_days(7)
//!     .with_level("info");
//!
//! let orders = registry.get_or_create("orders", &config);
//! orders.info("order placed", &[Field::new("order_id", 42)]);
//!
//! // At shutdown
//! registry.close_all();
//! ```

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{LoggerConfig, Mode, Encoding, load_config, ConfigError, ConfigResult};

pub use logging::{
    Logger, SharedLogger, LoggerBuilder, LoggerRegistry, LoggerFactory,
    Level, Field, SinkTarget,
};
