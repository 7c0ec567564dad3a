//! Logger configuration
//!
//! - `LoggerConfig`: the per-module settings handed to the registry
//! - `Mode` / `Encoding`: total parsers for the string-typed settings
//! - `load_config`: read a `LoggerConfig` from a YAML or JSON file

mod types;
mod file;

pub use types::{LoggerConfig, Mode, Encoding};
pub use file::{load_config, ConfigError, ConfigResult};
