// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{LauncherConfig, RawLauncherConfig};
use crate::errors::{QuietShellError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "QUIETSHELL_CONFIG";

/// File name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "QuietShell.toml";

/// Read and deserialize a config file without semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLauncherConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawLauncherConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Read, deserialize and validate a config file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LauncherConfig> {
    let raw = load_from_path(&path)?;
    LauncherConfig::try_from(raw)
}

/// Find and load the launcher configuration.
///
/// - `QUIETSHELL_CONFIG` set: that file must exist and be valid.
/// - otherwise `QuietShell.toml` beside the executable, if present.
/// - otherwise built-in defaults.
pub fn discover() -> Result<LauncherConfig> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(explicit);
        if !path.is_file() {
            return Err(QuietShellError::Config(format!(
                "{CONFIG_ENV_VAR} points to {:?}, which is not a file",
                path
            )));
        }
        debug!(config = ?path, "loading config from {CONFIG_ENV_VAR}");
        return load_and_validate(&path);
    }

    match beside_executable() {
        Some(path) if path.is_file() => {
            debug!(config = ?path, "loading config next to executable");
            load_and_validate(&path)
        }
        _ => Ok(LauncherConfig::default()),
    }
}

fn beside_executable() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(CONFIG_FILE_NAME))
}
