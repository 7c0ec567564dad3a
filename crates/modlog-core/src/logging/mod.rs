//! Per-module structured loggers
//!
//! - `LoggerRegistry`: caches one `Logger` per module name
//! - `LoggerBuilder`: turns a `LoggerConfig` into a `Logger`
//! - `Sink`: stdout or a daily rotating file

mod level;
mod field;
mod sink;
mod encoder;
mod logger;
mod builder;
mod registry;

pub use level::Level;
pub use field::Field;
pub use encoder::JsonRecord;
pub use sink::{RotatingFile, Sink, SinkError, SinkTarget, SinkWriter};
pub use logger::{Logger, SharedLogger};
pub use builder::LoggerBuilder;
pub use registry::{LoggerFactory, LoggerRegistry};
