// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::cmtrace::{DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB};

/// Launcher configuration as read from `QuietShell.toml`.
///
/// ```toml
/// [engine]
/// process_executable = "C:/Windows/System32/WindowsPowerShell/v1.0/powershell.exe"
/// host_executable = "pwsh"
///
/// [log]
/// directory = "C:/ProgramData/QuietShell/Logs"
/// max_size_mb = 2
/// max_backups = 10
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLauncherConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub log: LogSection,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct EngineSection {
    /// Executable spawned by the process strategy.
    ///
    /// Default: `powershell.exe` on Windows, `pwsh` elsewhere.
    #[serde(default)]
    pub process_executable: Option<String>,

    /// Executable backing host sessions. Default: `pwsh`.
    #[serde(default)]
    pub host_executable: Option<String>,
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LogSection {
    /// Directory for `QuietShell.log` when `-logpath` is not given.
    /// Defaults to the temp directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_max_size_mb() -> u64 {
    DEFAULT_MAX_SIZE_MB
}

fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            directory: None,
            max_size_mb: default_max_size_mb(),
            max_backups: default_max_backups(),
        }
    }
}

/// Validated launcher configuration. Obtain via `TryFrom<RawLauncherConfig>`
/// or [`crate::config::load_and_validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    pub engine: EngineSection,
    pub log: LogSection,
}

impl LauncherConfig {
    pub(crate) fn new_unchecked(engine: EngineSection, log: LogSection) -> Self {
        Self { engine, log }
    }

    pub fn process_executable(&self) -> &str {
        self.engine
            .process_executable
            .as_deref()
            .unwrap_or(if cfg!(windows) { "powershell.exe" } else { "pwsh" })
    }

    pub fn host_executable(&self) -> &str {
        self.engine.host_executable.as_deref().unwrap_or("pwsh")
    }
}
