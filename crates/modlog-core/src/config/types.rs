//! Logger configuration types

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::Level;

/// Output mode of a logger
///
/// Parsing is total: any string other than `file` or `volume` selects
/// `Console`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Write to standard output
    #[default]
    Console,
    /// Write to a daily rotating file
    File,
    /// Same as `File`, for mounted volumes in containers
    Volume,
}

impl Mode {
    pub fn parse(s: &str) -> Self {
        match s {
            "file" => Mode::File,
            "volume" => Mode::Volume,
            _ => Mode::Console,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Console => "console",
            Mode::File => "file",
            Mode::Volume => "volume",
        }
    }

    /// Whether this mode writes through the rotating file sink
    pub fn is_file_backed(&self) -> bool {
        matches!(self, Mode::File | Mode::Volume)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record encoding of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// One JSON object per line, for log pipelines
    #[default]
    Json,
    /// Colored human-readable lines, for terminals
    Plain,
}

impl Encoding {
    /// Only the exact string `plain` selects `Plain`; everything else,
    /// including the empty string, is `Json`.
    pub fn parse(s: &str) -> Self {
        match s {
            "plain" => Encoding::Plain,
            _ => Encoding::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Plain => "plain",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one module logger
///
/// String-typed on purpose: values come from user configuration and are
/// never rejected. Use `mode()`, `level()` and `encoding()` to get the
/// resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    /// Base directory for file output
    pub path: PathBuf,
    /// `file`, `volume` or anything else for stdout
    pub mode: String,
    /// Days of rotated files to retain; 0 keeps everything
    #[serde(alias = "keep_days")]
    pub keep_days: u32,
    /// Minimum severity, e.g. `debug`, `warning`, `error`
    pub level: String,
    /// `plain` or anything else for JSON
    pub encoding: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs"),
            mode: Mode::Console.as_str().to_string(),
            keep_days: 0,
            level: Level::Info.as_str().to_string(),
            encoding: Encoding::Json.as_str().to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_keep_days(mut self, keep_days: u32) -> Self {
        self.keep_days = keep_days;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Copy of this config with `segment` appended to the base path
    pub fn for_module(&self, segment: impl AsRef<Path>) -> Self {
        let mut config = self.clone();
        config.path = self.path.join(segment);
        config
    }

    pub fn mode(&self) -> Mode {
        Mode::parse(&self.mode)
    }

    pub fn level(&self) -> Level {
        Level::parse(&self.level)
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::parse(&self.encoding)
    }
}
