//! Rolling File Logger
//!
//! Installs a `tracing` subscriber (which also captures `log` records) that
//! writes through a daily `tracing-appender` file in `{log_dir}`, named
//! `{app_name}.{date}.log`, keeping the last few days. The most recent lines
//! are kept in a circular buffer so a UI can show them without reading the
//! files back.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Number of daily files kept on disk.
pub const MAX_LOG_FILES: usize = 7;

/// Number of lines retained in memory.
pub const BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<SharedWriter> = OnceLock::new();

#[derive(Debug)]
pub enum LoggerError {
    AlreadyInitialized,
    NotInitialized,
    Io(io::Error),
    Appender(String),
    Subscriber(String),
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::AlreadyInitialized => write!(f, "logger already initialized"),
            LoggerError::NotInitialized => write!(f, "logger not initialized"),
            LoggerError::Io(e) => write!(f, "log file error: {}", e),
            LoggerError::Appender(msg) => write!(f, "failed to open log file: {}", msg),
            LoggerError::Subscriber(msg) => write!(f, "failed to install subscriber: {}", msg),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

struct RollingFile {
    appender: RollingFileAppender,
    lines: VecDeque<String>,
    capacity: usize,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, capacity: usize) -> Result<Self, LoggerError> {
        std::fs::create_dir_all(dir)?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(app_name)
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(dir)
            .map_err(|e| LoggerError::Appender(e.to_string()))?;

        Ok(Self {
            appender,
            lines: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        self.appender.write_all(buf)?;

        for line in String::from_utf8_lossy(buf).lines() {
            if line.is_empty() {
                continue;
            }
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line.to_string());
        }
        Ok(())
    }
}

#[derive(Clone)]
struct SharedWriter(Arc<Mutex<RollingFile>>);

impl SharedWriter {
    fn recent(&self) -> Vec<String> {
        match self.0.lock() {
            Ok(inner) => inner.lines.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        inner.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        inner.appender.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the global logger at INFO level.
///
/// Returns the directory the log files are written to.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<PathBuf, LoggerError> {
    init_logger_with_level(log_dir, app_name, tracing::Level::INFO)
}

pub fn init_logger_with_level(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    level: tracing::Level,
) -> Result<PathBuf, LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let rolling = RollingFile::open(log_dir.as_ref(), app_name, BUFFER_LINES)?;
    let path = log_dir.as_ref().to_path_buf();
    let writer = SharedWriter(Arc::new(Mutex::new(rolling)));

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    LOGGER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    log::info!("logger started in {}", path.display());
    Ok(path)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    if LOGGER.get().is_none() {
        return Err(LoggerError::NotInitialized);
    }
    tracing::info!(target: "rolling_logger", "{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    if LOGGER.get().is_none() {
        return Err(LoggerError::NotInitialized);
    }
    tracing::error!(target: "rolling_logger", "{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before initialization.
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(SharedWriter::recent).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn log_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                let name = p.file_name().unwrap().to_string_lossy().to_string();
                name.starts_with(prefix) && name.ends_with(".log")
            })
            .collect()
    }

    #[test]
    fn test_records_land_in_dated_file() {
        let dir = tempdir().unwrap();
        let mut rolling = RollingFile::open(dir.path(), "app", 10).unwrap();

        rolling.write_record(b"first line\n").unwrap();
        rolling.write_record(b"second line\n").unwrap();
        rolling.appender.flush().unwrap();

        let files = log_files(dir.path(), "app.");
        assert_eq!(files.len(), 1);
        let text = std::fs::read_to_string(&files[0]).unwrap();
        assert_eq!(text, "first line\nsecond line\n");
    }

    #[test]
    fn test_circular_buffer_keeps_latest_lines() {
        let dir = tempdir().unwrap();
        let mut rolling = RollingFile::open(dir.path(), "app", 2).unwrap();

        for i in 0..5 {
            rolling.write_record(format!("line {}\n", i).as_bytes()).unwrap();
        }

        let lines: Vec<_> = rolling.lines.iter().cloned().collect();
        assert_eq!(lines, vec!["line 3".to_string(), "line 4".to_string()]);
    }

    #[test]
    fn test_init_and_capture() {
        let dir = tempdir().unwrap();
        let path = init_logger(dir.path(), "Fridge").unwrap();
        assert_eq!(path, dir.path());

        info("hello from test").unwrap();
        log::warn!("bridged from log");

        let recent = recent_lines();
        assert!(recent.iter().any(|l| l.contains("hello from test")));
        assert!(recent.iter().any(|l| l.contains("bridged from log")));
        assert!(!log_files(dir.path(), "Fridge.").is_empty());
        assert!(matches!(
            init_logger(dir.path(), "Fridge"),
            Err(LoggerError::AlreadyInitialized)
        ));
    }
}
