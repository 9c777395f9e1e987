// src/exec/mod.rs

//! Execution strategies.
//!
//! Exactly one strategy runs per launch, chosen once from
//! [`RunOptions::mode`]:
//!
//! - [`host`] drives an engine session through the [`host::ScriptEngine`]
//!   seam (production engine in [`host::pwsh`], fakes in tests).
//! - [`process`] spawns the engine executable with its public command line.
//!
//! Both report through the shared [`CmTraceLogger`] and return a
//! process-style exit code: `0` success, `1` validation or script errors,
//! `-1` unexpected failure, `-2` timeout.

pub mod cmdline;
pub mod host;
pub mod process;
pub mod stream;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use crate::cmtrace::CmTraceLogger;
use crate::config::LauncherConfig;
use crate::errors::{QuietShellError, Result};
use crate::options::{Payload, RunOptions};
use crate::types::ExecutionMode;

pub use host::{HostStrategy, ScriptEngine};
pub use process::ProcessStrategy;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A way of running the payload described by [`RunOptions`].
pub trait Strategy: Send + Sync {
    /// Run to completion (or timeout) and return the exit code.
    ///
    /// Never fails: every error is logged and mapped to its exit code.
    fn execute<'a>(
        &'a self,
        options: &'a RunOptions,
        logger: &'a Arc<CmTraceLogger>,
    ) -> BoxFuture<'a, i32>;
}

/// The strategy selected for this launch.
#[derive(Debug)]
pub enum ExecutionStrategy {
    Host(HostStrategy),
    Process(ProcessStrategy),
}

impl ExecutionStrategy {
    /// Pick the strategy for `options`, with engine executables from `config`.
    pub fn for_options(options: &RunOptions, config: &LauncherConfig) -> Self {
        match options.mode() {
            ExecutionMode::Host => ExecutionStrategy::Host(HostStrategy::new(Arc::new(
                host::PwshEngine::new(config.host_executable()),
            ))),
            ExecutionMode::Process => {
                ExecutionStrategy::Process(ProcessStrategy::new(config.process_executable()))
            }
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            ExecutionStrategy::Host(_) => ExecutionMode::Host,
            ExecutionStrategy::Process(_) => ExecutionMode::Process,
        }
    }
}

impl Strategy for ExecutionStrategy {
    fn execute<'a>(
        &'a self,
        options: &'a RunOptions,
        logger: &'a Arc<CmTraceLogger>,
    ) -> BoxFuture<'a, i32> {
        logger.info(
            &format!("Starting execution. Mode: {}", self.mode()),
            "Runner",
        );
        match self {
            ExecutionStrategy::Host(s) => s.execute(options, logger),
            ExecutionStrategy::Process(s) => s.execute(options, logger),
        }
    }
}

/// Resolve the payload and check that a script file exists, before any
/// engine work starts.
pub(crate) fn resolve_payload(options: &RunOptions) -> Result<Payload> {
    let payload = options.payload().ok_or(QuietShellError::NoPayload)?;
    if let Payload::Script { path, .. } = &payload {
        if !Path::new(path).is_file() {
            return Err(QuietShellError::ScriptNotFound(path.into()));
        }
    }
    Ok(payload)
}

/// Map a strategy result to its exit code, logging failures that were not
/// logged where they happened.
pub(crate) fn finish(
    result: Result<i32>,
    logger: &CmTraceLogger,
    component: &str,
    failure_label: &str,
) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            if err.is_validation() {
                logger.error(&err.to_string(), component);
            } else if !err.already_logged() {
                logger.error_with(failure_label, component, &err);
            }
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_payload_is_a_validation_error() {
        let err = resolve_payload(&RunOptions::default()).unwrap_err();
        assert!(matches!(err, QuietShellError::NoPayload));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_script_file_is_a_validation_error() {
        let options = RunOptions {
            script_path: Some("definitely/not/here.ps1".into()),
            ..RunOptions::default()
        };
        let err = resolve_payload(&options).unwrap_err();
        assert!(matches!(err, QuietShellError::ScriptNotFound(_)));
    }

    #[test]
    fn command_payload_needs_no_file() {
        let options = RunOptions {
            command: Some("Get-Date".into()),
            ..RunOptions::default()
        };
        assert_eq!(
            resolve_payload(&options).unwrap(),
            Payload::Command("Get-Date".into())
        );
    }

    #[test]
    fn strategy_follows_mode_flag() {
        let config = LauncherConfig::default();
        let host = ExecutionStrategy::for_options(&RunOptions::default(), &config);
        assert_eq!(host.mode(), ExecutionMode::Host);

        let process = ExecutionStrategy::for_options(
            &RunOptions {
                use_host: false,
                ..RunOptions::default()
            },
            &config,
        );
        assert_eq!(process.mode(), ExecutionMode::Process);
        match process {
            ExecutionStrategy::Process(p) => {
                assert_eq!(p.executable(), config.process_executable())
            }
            other => panic!("expected process strategy, got {other:?}"),
        }
    }

    #[test]
    fn configured_executables_reach_the_strategies() {
        let config: LauncherConfig = toml::from_str::<crate::config::RawLauncherConfig>(
            "[engine]\nprocess_executable = \"/opt/ps/pwsh\"\nhost_executable = \"/opt/ps/pwsh-host\"\n",
        )
        .expect("valid toml")
        .try_into()
        .expect("valid config");

        let process = ExecutionStrategy::for_options(
            &RunOptions {
                use_host: false,
                ..RunOptions::default()
            },
            &config,
        );
        assert!(matches!(
            &process,
            ExecutionStrategy::Process(p) if p.executable() == "/opt/ps/pwsh"
        ));
        assert_eq!(config.host_executable(), "/opt/ps/pwsh-host");
    }
}
