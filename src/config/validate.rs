// src/config/validate.rs

use crate::config::model::{LauncherConfig, RawLauncherConfig};
use crate::errors::{QuietShellError, Result};

impl TryFrom<RawLauncherConfig> for LauncherConfig {
    type Error = QuietShellError;

    fn try_from(raw: RawLauncherConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(LauncherConfig::new_unchecked(raw.engine, raw.log))
    }
}

fn validate_raw_config(cfg: &RawLauncherConfig) -> Result<()> {
    validate_log_section(cfg)?;
    validate_engine_section(cfg)?;
    Ok(())
}

fn validate_log_section(cfg: &RawLauncherConfig) -> Result<()> {
    if cfg.log.max_size_mb == 0 {
        return Err(QuietShellError::Config(
            "[log].max_size_mb must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.log.max_backups == 0 {
        return Err(QuietShellError::Config(
            "[log].max_backups must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_engine_section(cfg: &RawLauncherConfig) -> Result<()> {
    let executables = [
        ("process_executable", &cfg.engine.process_executable),
        ("host_executable", &cfg.engine.host_executable),
    ];
    for (key, value) in executables {
        if let Some(exe) = value {
            if exe.trim().is_empty() {
                return Err(QuietShellError::Config(format!(
                    "[engine].{key} must not be empty"
                )));
            }
        }
    }
    Ok(())
}
