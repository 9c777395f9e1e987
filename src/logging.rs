// src/logging.rs

//! Developer diagnostics for `quietshell` using `tracing` + `tracing-subscriber`.
//!
//! This is not the CMTrace log (see [`crate::cmtrace`]); it is the
//! launcher's own trace output, off by default so that a normal run stays
//! silent on the console.
//!
//! The level comes from the `QUIETSHELL_LOG` environment variable
//! (e.g. "info", "debug") and defaults to `warn`. Output goes to STDERR so
//! that payload output on STDOUT stays untouched.

use anyhow::Result;
use tracing_subscriber::fmt;

/// Environment variable selecting the diagnostic level.
pub const LOG_ENV_VAR: &str = "QUIETSHELL_LOG";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging() -> Result<()> {
    let level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|s| parse_level_str(&s))
        .unwrap_or(tracing::Level::WARN);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(())
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strings_are_case_insensitive() {
        assert_eq!(parse_level_str(" DEBUG "), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level_str("warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }
}
