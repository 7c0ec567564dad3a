//! Logger construction: sink, threshold and encoder selection

use std::fs;

use tracing::Dispatch;
use tracing_subscriber::fmt::{self, time::ChronoLocal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

use super::encoder::JsonRecord;
use super::logger::Logger;
use super::sink::{RotatingFile, Sink, SinkError};
use crate::config::{Encoding, LoggerConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builds module loggers from a `LoggerConfig`
///
/// Construction never fails: configuration that cannot be honored
/// degrades to a stdout sink and documented defaults. Building emits no
/// events; a stdout fallback is recorded on the logger (`Logger::fallback`)
/// for the caller to report once it holds no locks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerBuilder;

impl LoggerBuilder {
    /// Build a logger for `name` writing under `config.path`
    pub fn build(name: &str, config: &LoggerConfig) -> Logger {
        let (sink, fallback) = match open_sink(name, config) {
            Ok(sink) => (sink, None),
            Err(e) => (Sink::stdout(), Some(e)),
        };
        let level = config.level();
        let encoding = config.encoding();

        let subscriber = tracing_subscriber::registry()
            .with(encoder_layer(encoding, sink.clone()))
            .with(level.as_filter());

        Logger::new(name, level, encoding, sink, Dispatch::new(subscriber), fallback)
    }
}

/// Rotating file for `file`/`volume` modes, stdout for every other mode
///
/// An error means the rotating file was wanted but could not be opened.
fn open_sink(name: &str, config: &LoggerConfig) -> Result<Sink, SinkError> {
    if !config.mode().is_file_backed() {
        return Ok(Sink::stdout());
    }

    // Best-effort; opening the file reports the real failure
    let _ = fs::create_dir_all(&config.path);

    RotatingFile::open(&config.path, name, config.keep_days).map(Sink::rotating)
}

fn encoder_layer(encoding: Encoding, sink: Sink) -> BoxedLayer {
    match encoding {
        Encoding::Plain => Box::new(
            fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_timer(ChronoLocal::rfc_3339())
                .with_writer(sink),
        ),
        Encoding::Json => Box::new(
            fmt::layer()
                .event_format(JsonRecord::new())
                .with_writer(sink),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Encoding;
    use crate::logging::{Field, Level, SinkTarget};
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::tempdir;

    fn file_config(dir: &std::path::Path) -> LoggerConfig {
        LoggerConfig::new().with_path(dir).with_mode("file")
    }

    #[test]
    fn test_console_mode_creates_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("console");

        for mode in ["console", "", "stdout", "FILE"] {
            let config = LoggerConfig::new().with_path(&path).with_mode(mode);
            let logger = LoggerBuilder::build("svc", &config);
            assert_eq!(logger.target(), SinkTarget::Stdout);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_file_and_volume_modes_create_directory() {
        let dir = tempdir().unwrap();

        for mode in ["file", "volume"] {
            let path = dir.path().join(mode);
            let config = LoggerConfig::new().with_path(&path).with_mode(mode);
            let logger = LoggerBuilder::build("svc", &config);

            assert!(path.is_dir());
            assert!(logger.fallback().is_none());
            assert_eq!(
                logger.target(),
                SinkTarget::RotatingFile {
                    directory: path.clone(),
                    link: path.join("svc.log"),
                }
            );
        }
    }

    #[test]
    fn test_unwritable_path_falls_back_to_stdout() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let config = file_config(&blocker.join("nested"));
        let logger = LoggerBuilder::build("svc", &config);

        assert_eq!(logger.target(), SinkTarget::Stdout);
        assert!(matches!(logger.fallback(), Some(SinkError::Open { .. })));
        logger.info("still works", &[Field::new("k", "v")]);
        logger.error("still works", &[]);
        assert!(logger.flush().is_ok());
    }

    #[test]
    fn test_level_threshold() {
        let dir = tempdir().unwrap();
        let logger = LoggerBuilder::build("svc", &file_config(dir.path()).with_level("warning"));
        assert_eq!(logger.level(), Level::Warn);

        logger.debug("d", &[]);
        logger.info("i", &[]);
        logger.warn("w", &[]);
        logger.error("e", &[]);
        logger.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("svc.log")).unwrap();
        let messages: Vec<String> = content
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(messages, vec!["w", "e"]);
    }

    #[test]
    fn test_fatal_threshold_suppresses_everything() {
        let dir = tempdir().unwrap();
        let logger = LoggerBuilder::build("svc", &file_config(dir.path()).with_level("severe"));
        assert_eq!(logger.level(), Level::Fatal);

        logger.error("e", &[]);
        logger.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("svc.log")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_json_encoding() {
        let dir = tempdir().unwrap();
        let logger = LoggerBuilder::build("svc", &file_config(dir.path()).with_encoding(""));
        assert_eq!(logger.encoding(), Encoding::Json);

        logger.info(
            "request done",
            &[Field::duration("elapsed", Duration::from_millis(250)), Field::new("status", 200)],
        );
        logger.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("svc.log")).unwrap();
        assert!(!content.contains('\u{1b}'));

        let record: Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["module"], "svc");
        assert_eq!(record["message"], "request done");
        assert!(chrono::DateTime::parse_from_rfc3339(record["timestamp"].as_str().unwrap()).is_ok());

        // Attachments are structured, top-level keys
        assert_eq!(record["elapsed"], 0.25);
        assert_eq!(record["status"], 200);
        assert!(record.get("attrs").is_none());
    }

    #[test]
    fn test_plain_encoding() {
        let dir = tempdir().unwrap();
        let logger = LoggerBuilder::build("svc", &file_config(dir.path()).with_encoding("plain"));
        assert_eq!(logger.encoding(), Encoding::Plain);

        logger.warn("disk almost full", &[]);
        logger.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("svc.log")).unwrap();
        assert!(content.contains('\u{1b}'), "expected ANSI colors: {content:?}");
        assert!(content.contains("WARN"));
        assert!(content.contains("disk almost full"));
        assert!(content.contains("svc"));
        assert!(serde_json::from_str::<Value>(content.trim()).is_err());
    }

    #[test]
    fn test_loggers_are_isolated() {
        let dir = tempdir().unwrap();
        let quiet = LoggerBuilder::build("quiet", &file_config(dir.path()).with_level("error"));
        let chatty = LoggerBuilder::build("chatty", &file_config(dir.path()).with_level("debug"));

        quiet.debug("q", &[]);
        chatty.debug("c", &[]);
        quiet.flush().unwrap();
        chatty.flush().unwrap();

        assert!(fs::read_to_string(dir.path().join("quiet.log")).unwrap().is_empty());
        let chatty_content = fs::read_to_string(dir.path().join("chatty.log")).unwrap();
        assert_eq!(chatty_content.lines().count(), 1);
        assert!(!chatty_content.contains("\"module\":\"quiet\""));
    }
}
