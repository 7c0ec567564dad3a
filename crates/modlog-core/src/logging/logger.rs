//! Module logger handle

use std::io;
use std::panic::Location;
use std::sync::Arc;

use tracing::Dispatch;

use super::field::{self, Field};
use super::level::Level;
use super::sink::{Sink, SinkError, SinkTarget};
use crate::config::Encoding;

/// Type alias for a logger shared between callers
pub type SharedLogger = Arc<Logger>;

/// A structured logger bound to one module name
///
/// Every record carries `module = <name>` and `caller = <file:line:col>` of
/// the code that called the logging method. The handle owns a private
/// dispatcher, so it never depends on (or installs) a global subscriber.
pub struct Logger {
    name: String,
    level: Level,
    encoding: Encoding,
    sink: Sink,
    dispatch: Dispatch,
    fallback: Option<SinkError>,
}

// Event level and field names must be constants for the engine's static
// callsites; `attrs` is flattened into the record by the JSON encoder.
macro_rules! emit {
    ($logger:expr, $level:expr, $message:expr, $fields:expr) => {{
        let logger: &Logger = $logger;
        let message: &str = $message;
        let fields: &[Field] = $fields;
        let caller = Location::caller();
        tracing::dispatcher::with_default(&logger.dispatch, || {
            if fields.is_empty() {
                tracing::event!($level, module = %logger.name, caller = %caller, "{}", message);
            } else {
                tracing::event!(
                    $level,
                    module = %logger.name,
                    caller = %caller,
                    attrs = %field::to_object(fields),
                    "{}",
                    message
                );
            }
        });
    }};
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<String>,
        level: Level,
        encoding: Encoding,
        sink: Sink,
        dispatch: Dispatch,
        fallback: Option<SinkError>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            encoding,
            sink,
            dispatch,
            fallback,
        }
    }

    /// Module name bound to every record
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum severity this logger emits
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Where records are written
    pub fn target(&self) -> SinkTarget {
        self.sink.target()
    }

    /// Why the configured file sink was replaced by stdout, if it was
    pub fn fallback(&self) -> Option<&SinkError> {
        self.fallback.as_ref()
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        emit!(self, tracing::Level::DEBUG, message, fields);
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        emit!(self, tracing::Level::INFO, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        emit!(self, tracing::Level::WARN, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field]) {
        emit!(self, tracing::Level::ERROR, message, fields);
    }

    /// Force buffered output down to the sink
    pub fn flush(&self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("encoding", &self.encoding)
            .field("target", &self.sink.target())
            .finish()
    }
}

/// Convenience macros for logging with attachments
///
/// ```
/// use modlog_core::{log_info, LoggerBuilder, LoggerConfig};
///
/// let logger = LoggerBuilder::build("orders", &LoggerConfig::default());
/// log_info!(logger, "order placed", "order_id" => 42, "express" => true);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.debug(&$message, &[$($crate::Field::new($key, $value)),*])
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.info(&$message, &[$($crate::Field::new($key, $value)),*])
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.warn(&$message, &[$($crate::Field::new($key, $value)),*])
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.error(&$message, &[$($crate::Field::new($key, $value)),*])
    };
}
