// src/errors.rs

//! Crate-wide error type and exit-code mapping.
//!
//! Validation and engine failures travel as values of [`QuietShellError`]
//! instead of being printed and forgotten; the strategy layer turns them into
//! the process exit code with [`QuietShellError::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for validation failures and engine-reported errors.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for anything unexpected.
pub const EXIT_UNHANDLED: i32 = -1;
/// Exit code when the payload ran past its timeout.
pub const EXIT_TIMEOUT: i32 = -2;

#[derive(Error, Debug)]
pub enum QuietShellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Script file not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("No script, command, or encoded command specified")]
    NoPayload,

    #[error("script reported {0} error(s)")]
    EngineReported(usize),

    #[error("timed out after {0} seconds")]
    TimedOut(u64),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuietShellError {
    /// Process exit code this failure maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            QuietShellError::ScriptNotFound(_)
            | QuietShellError::NoPayload
            | QuietShellError::EngineReported(_) => EXIT_FAILURE,
            QuietShellError::TimedOut(_) => EXIT_TIMEOUT,
            QuietShellError::Config(_)
            | QuietShellError::Io(_)
            | QuietShellError::Toml(_)
            | QuietShellError::Other(_) => EXIT_UNHANDLED,
        }
    }

    /// True when the details were already written to the log where the
    /// failure happened (individual engine errors, timeout message).
    pub fn already_logged(&self) -> bool {
        matches!(
            self,
            QuietShellError::EngineReported(_) | QuietShellError::TimedOut(_)
        )
    }

    /// Validation failures are logged as plain messages; everything else
    /// gets its full cause chain appended.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QuietShellError::ScriptNotFound(_) | QuietShellError::NoPayload
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, QuietShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_class() {
        assert_eq!(QuietShellError::NoPayload.exit_code(), 1);
        assert_eq!(
            QuietShellError::ScriptNotFound(PathBuf::from("x.ps1")).exit_code(),
            1
        );
        assert_eq!(QuietShellError::EngineReported(3).exit_code(), 1);
        assert_eq!(QuietShellError::TimedOut(5).exit_code(), -2);
        assert_eq!(
            QuietShellError::Other(anyhow::anyhow!("boom")).exit_code(),
            -1
        );
        assert_eq!(QuietShellError::Config("bad".into()).exit_code(), -1);
    }

    #[test]
    fn script_not_found_message_names_the_path() {
        let err = QuietShellError::ScriptNotFound(PathBuf::from("missing.ps1"));
        assert_eq!(err.to_string(), "Script file not found: missing.ps1");
    }
}
