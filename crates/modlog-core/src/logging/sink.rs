//! Output sinks: standard output or a daily rotating file
//!
//! The rotating file writes to `<dir>/<prefix>-<YYYY-MM-DD>.log`, switching
//! files when the local calendar date changes, and keeps `<prefix>.log`
//! pointing at the file currently being written. Dated files whose last
//! modification is older than the retention window are removed on open and
//! on every rotation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{Local, NaiveDate};
use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing_subscriber::fmt::writer::MakeWriter;

const LOG_EXTENSION: &str = "log";
const DATE_FORMAT: &str = "%Y-%m-%d";
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Errors raised while setting up a sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a logger's records end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    RotatingFile {
        /// Directory holding the dated files
        directory: PathBuf,
        /// Stable alias to the current file
        link: PathBuf,
    },
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// `<prefix>-<YYYY-MM-DD>.log`
pub fn dated_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.{}", prefix, date.format(DATE_FORMAT), LOG_EXTENSION)
}

/// Date of a file named by `dated_file_name` for this prefix
fn parse_dated_file_name(prefix: &str, file_name: &str) -> Option<NaiveDate> {
    let date = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(LOG_EXTENSION)?
        .strip_suffix('.')?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

struct ActiveFile {
    date: NaiveDate,
    file: File,
}

/// A daily rotating file plus its stable alias
pub struct RotatingFile {
    directory: PathBuf,
    prefix: String,
    link: PathBuf,
    max_age: Option<Duration>,
    clock: Clock,
    active: Mutex<ActiveFile>,
}

impl RotatingFile {
    /// Open today's file in `directory`, rotating on the local date
    ///
    /// With `keep_days > 0`, dated files not modified for `keep_days` days
    /// are removed. With 0 every file is kept.
    pub fn open(directory: impl AsRef<Path>, prefix: &str, keep_days: u32) -> Result<Self, SinkError> {
        Self::open_with_clock(directory, prefix, keep_days, Box::new(local_today))
    }

    fn open_with_clock(
        directory: impl AsRef<Path>,
        prefix: &str,
        keep_days: u32,
        clock: Clock,
    ) -> Result<Self, SinkError> {
        let directory = directory.as_ref().to_path_buf();
        let date = clock();
        let file = open_append(&directory.join(dated_file_name(prefix, date)))?;

        let rotating = Self {
            link: directory.join(format!("{}.{}", prefix, LOG_EXTENSION)),
            directory,
            prefix: prefix.to_string(),
            max_age: (keep_days > 0).then(|| Duration::from_secs(u64::from(keep_days) * SECS_PER_DAY)),
            clock,
            active: Mutex::new(ActiveFile { date, file }),
        };
        rotating.refresh_link(date);
        rotating.prune(date);
        Ok(rotating)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn link(&self) -> &Path {
        &self.link
    }

    /// Name of the file currently written
    pub fn current_file_name(&self) -> String {
        dated_file_name(&self.prefix, self.active.lock().date)
    }

    /// Lock the active file, switching to a new one if the date moved
    ///
    /// If the new file cannot be opened, writes keep going to the old one.
    fn active_for_write(&self) -> MutexGuard<'_, ActiveFile> {
        let mut active = self.active.lock();
        let today = (self.clock)();
        if today != active.date {
            if let Ok(file) = open_append(&self.directory.join(dated_file_name(&self.prefix, today))) {
                *active = ActiveFile { date: today, file };
                self.refresh_link(today);
                self.prune(today);
            }
        }
        active
    }

    /// Point the alias at the file for `date`
    ///
    /// Best-effort: a failed link never fails a write. Runs inside the
    /// encoder's write path, so it must not emit events itself.
    fn refresh_link(&self, date: NaiveDate) {
        let _ = replace_link(&self.directory, &dated_file_name(&self.prefix, date), &self.link);
    }

    /// Remove dated files older than the retention window, except `current`
    fn prune(&self, current: NaiveDate) {
        let Some(max_age) = self.max_age else {
            return;
        };
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return;
        };
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return;
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            match parse_dated_file_name(&self.prefix, file_name) {
                Some(date) if date != current => {}
                _ => continue,
            }
            // The alias is a symlink; only plain dated files are pruned
            let Ok(metadata) = fs::symlink_metadata(entry.path()) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            if metadata.modified().is_ok_and(|modified| modified < cutoff) {
                let _ = fs::remove_file(entry.path());
            }
        }
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("directory", &self.directory)
            .field("prefix", &self.prefix)
            .field("link", &self.link)
            .field("max_age", &self.max_age)
            .finish()
    }
}

fn open_append(path: &Path) -> Result<File, SinkError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
fn replace_link(_directory: &Path, file_name: &str, link: &Path) -> io::Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_file(link)?;
    }
    // Relative target so the directory can be moved
    std::os::unix::fs::symlink(file_name, link)
}

#[cfg(not(unix))]
fn replace_link(directory: &Path, file_name: &str, link: &Path) -> io::Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_file(link)?;
    }
    fs::hard_link(directory.join(file_name), link)
}

#[derive(Debug)]
enum SinkKind {
    Stdout,
    Rotating(RotatingFile),
}

/// Shared handle on a sink; cheap to clone
#[derive(Debug, Clone)]
pub struct Sink {
    inner: Arc<SinkKind>,
}

impl Sink {
    pub fn stdout() -> Self {
        Self {
            inner: Arc::new(SinkKind::Stdout),
        }
    }

    pub fn rotating(file: RotatingFile) -> Self {
        Self {
            inner: Arc::new(SinkKind::Rotating(file)),
        }
    }

    pub fn target(&self) -> SinkTarget {
        match &*self.inner {
            SinkKind::Stdout => SinkTarget::Stdout,
            SinkKind::Rotating(file) => SinkTarget::RotatingFile {
                directory: file.directory().to_path_buf(),
                link: file.link().to_path_buf(),
            },
        }
    }

    /// Force buffered bytes down to the sink
    pub fn flush(&self) -> io::Result<()> {
        self.make_writer().flush()
    }
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match &*self.inner {
            SinkKind::Stdout => SinkWriter::Stdout(io::stdout()),
            SinkKind::Rotating(file) => SinkWriter::Rotating(file),
        }
    }
}

/// Writer handed to the encoder for a single record
pub enum SinkWriter<'a> {
    Stdout(io::Stdout),
    Rotating(&'a RotatingFile),
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Stdout(out) => out.write(buf),
            SinkWriter::Rotating(file) => file.active_for_write().file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Stdout(out) => out.flush(),
            SinkWriter::Rotating(file) => file.active.lock().file.flush(),
        }
    }
}
