// src/cmtrace/logger.rs

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::entry::{LogEntry, Severity};
use super::{fallback, rotation};

pub const DEFAULT_LOG_FILE_NAME: &str = "QuietShell.log";
pub const DEFAULT_MAX_SIZE_MB: u64 = 2;
pub const DEFAULT_MAX_BACKUPS: usize = 10;

const BYTES_PER_MB: u64 = 1024 * 1024;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// `<dir>/QuietShell.log`, with `dir` defaulting to the temp directory.
pub fn default_log_path(dir: Option<&Path>) -> PathBuf {
    match dir {
        Some(dir) => dir.join(DEFAULT_LOG_FILE_NAME),
        None => std::env::temp_dir().join(DEFAULT_LOG_FILE_NAME),
    }
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub path: PathBuf,
    /// Rotate once the file has reached this many bytes.
    pub max_bytes: u64,
    pub max_backups: usize,
}

impl LogSettings {
    pub fn new(path: impl Into<PathBuf>, max_size_mb: u64) -> Self {
        Self {
            path: path.into(),
            max_bytes: max_size_mb.saturating_mul(BYTES_PER_MB),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }
}

/// Thread-safe CMTrace file writer.
///
/// Every append holds the internal lock across the size check, rotation and
/// write, so concurrent callers (stream readers, the main task) never
/// interleave lines or race a rotation. Failures never reach the caller;
/// they go to the console fallback instead.
#[derive(Debug)]
pub struct CmTraceLogger {
    file: Mutex<LogFile>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug)]
struct LogFile {
    settings: LogSettings,
}

impl CmTraceLogger {
    pub fn new(settings: LogSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: LogSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            file: Mutex::new(LogFile { settings }),
            clock,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.lock().settings.path.clone()
    }

    pub fn info(&self, message: &str, component: &str) {
        self.log(message, component, Severity::Info);
    }

    pub fn warning(&self, message: &str, component: &str) {
        self.log(message, component, Severity::Warning);
    }

    pub fn error(&self, message: &str, component: &str) {
        self.log(message, component, Severity::Error);
    }

    /// Error entry with the failure (and its causes) appended.
    pub fn error_with(&self, message: &str, component: &str, err: &dyn fmt::Display) {
        self.log(&format!("{message}: {err:#}"), component, Severity::Error);
    }

    /// Append one entry.
    pub fn log(&self, message: &str, component: &str, severity: Severity) {
        if let Err(err) = self.try_log(message, component, severity) {
            fallback(&format!("Logging failed: {err:#}"));
        }
    }

    /// Append one entry, reporting a failed write to the caller instead of
    /// the console. Rotation problems are still only reported on the console.
    pub fn try_log(&self, message: &str, component: &str, severity: Severity) -> Result<()> {
        let mut file = self.lock();
        file.append(message, component, severity, self.clock.as_ref())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogFile> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogFile {
    fn append(
        &mut self,
        message: &str,
        component: &str,
        severity: Severity,
        clock: &dyn Clock,
    ) -> Result<()> {
        self.rotate_if_full(clock);

        let entry = LogEntry::new(message, component, severity, clock.now());
        let path = &self.settings.path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {:?}", parent))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {:?}", path))?;

        file.write_all(format!("{entry}{LINE_ENDING}").as_bytes())
            .with_context(|| format!("writing to log file {:?}", path))?;
        Ok(())
    }

    fn rotate_if_full(&self, clock: &dyn Clock) {
        let path = &self.settings.path;
        let len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(_) => return,
        };
        if len < self.settings.max_bytes {
            return;
        }

        match rotation::rotate(path, clock.now()) {
            Ok(_) => match rotation::prune_backups(path, self.settings.max_backups) {
                Ok(removed) if removed > 0 => debug!(removed, "pruned old log backups"),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "log backup cleanup failed"),
            },
            Err(err) => fallback(&format!("Log rollover failed: {err:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_convert_megabytes() {
        let settings = LogSettings::new("a.log", 2);
        assert_eq!(settings.max_bytes, 2 * 1024 * 1024);
        assert_eq!(settings.max_backups, 10);
        assert_eq!(settings.with_max_backups(3).max_backups, 3);
    }

    #[test]
    fn default_path_uses_tool_name() {
        let dir = Path::new("logs");
        assert_eq!(default_log_path(Some(dir)), dir.join("QuietShell.log"));
        assert!(default_log_path(None).ends_with("QuietShell.log"));
    }
}
