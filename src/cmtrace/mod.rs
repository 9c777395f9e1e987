// src/cmtrace/mod.rs

//! CMTrace-format log file writer.
//!
//! This is the launcher's user-facing log (readable with CMTrace and similar
//! viewers), separate from the developer diagnostics in [`crate::logging`].
//!
//! - [`entry`] formats one `<![LOG[...]LOG]!>` line.
//! - [`logger`] owns the file behind a mutex and appends entries.
//! - [`rotation`] renames full files aside and prunes old backups.
//! - [`clock`] abstracts local time so rotation is testable.

pub mod clock;
pub mod entry;
pub mod logger;
pub mod rotation;

pub use clock::{Clock, SystemClock};
pub use entry::{LogEntry, Severity, escape_xml};
pub use logger::{
    CmTraceLogger, DEFAULT_LOG_FILE_NAME, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB, LogSettings,
    default_log_path,
};

/// Last-resort channel for failures of the log itself.
pub(crate) fn fallback(message: &str) {
    tracing::warn!("{message}");
    println!("{message}");
}
