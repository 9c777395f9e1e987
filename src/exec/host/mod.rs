// src/exec/host/mod.rs

//! Host strategy: run the payload inside an engine session.
//!
//! - [`engine`] defines the session seam ([`ScriptEngine`], [`HostSession`]).
//! - [`pwsh`] is the production engine.
//! - [`encoding`] handles `-EncodedCommand` text.

pub mod encoding;
pub mod engine;
pub mod pwsh;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cmtrace::CmTraceLogger;
use crate::errors::{EXIT_SUCCESS, QuietShellError, Result};
use crate::exec::{BoxFuture, Strategy, finish, resolve_payload};
use crate::options::{Payload, RunOptions};
use crate::types::{Apartment, ExecutionPolicy};

pub use encoding::{decode_encoded_command, encode_command};
pub use engine::{HostSession, Invocation, InvocationResult, ScriptEngine, SessionSettings};
pub use pwsh::PwshEngine;

const COMPONENT: &str = "HostStrategy";

/// Runs the payload through a [`ScriptEngine`] session.
#[derive(Debug, Clone)]
pub struct HostStrategy {
    engine: Arc<dyn ScriptEngine>,
}

impl HostStrategy {
    pub fn new(engine: Arc<dyn ScriptEngine>) -> Self {
        Self { engine }
    }

    async fn run(&self, options: &RunOptions, logger: &Arc<CmTraceLogger>) -> Result<i32> {
        logger.info("Creating engine session", COMPONENT);

        let invocation = match resolve_payload(options)? {
            Payload::Script { path, args } => Invocation::Script { path, args },
            Payload::Command(text) => Invocation::Text(text),
            Payload::Encoded(encoded) => Invocation::Text(decode_encoded_command(&encoded)?),
        };

        let settings = SessionSettings {
            execution_policy: options
                .execution_policy
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| parse_execution_policy(p, logger)),
            apartment: Apartment::from_mta_flag(options.mta),
            reuse_thread: true,
        };

        let mut session = self.engine.open_session(&settings).await?;
        logger.info("Engine session opened successfully", COMPONENT);

        if let Some(dir) = options.working_directory.as_deref().filter(|d| !d.is_empty()) {
            session.set_location(dir).await?;
        }

        logger.info("Executing script/command", COMPONENT);
        let limit = Duration::from_secs(options.timeout_secs);
        let outcome = tokio::time::timeout(limit, session.invoke(&invocation)).await;
        let result = match outcome {
            Ok(result) => result?,
            Err(_) => {
                info!(timeout_secs = options.timeout_secs, "stopping timed-out invocation");
                if let Err(e) = session.stop().await {
                    debug!(error = %e, "stopping the session failed");
                }
                logger.error(
                    &format!(
                        "Engine session timed out after {} seconds",
                        options.timeout_secs
                    ),
                    COMPONENT,
                );
                return Err(QuietShellError::TimedOut(options.timeout_secs));
            }
        };

        report_result(&result, options.log_output_stream, logger)
    }
}

impl Strategy for HostStrategy {
    fn execute<'a>(
        &'a self,
        options: &'a RunOptions,
        logger: &'a Arc<CmTraceLogger>,
    ) -> BoxFuture<'a, i32> {
        Box::pin(async move {
            let result = self.run(options, logger).await;
            finish(result, logger, COMPONENT, "Runspace execution failed")
        })
    }
}

/// Log the streams of a finished invocation and pick the exit code.
fn report_result(
    result: &InvocationResult,
    log_output: bool,
    logger: &CmTraceLogger,
) -> Result<i32> {
    if log_output {
        for value in result.output.iter().flatten() {
            logger.info(&format!("Output: {value}"), COMPONENT);
        }
    }

    if result.had_errors() {
        for error in &result.errors {
            logger.error(&format!("PowerShell Error: {error}"), COMPONENT);
        }
        return Err(QuietShellError::EngineReported(result.errors.len()));
    }

    for warning in &result.warnings {
        logger.warning(&format!("PowerShell Warning: {warning}"), COMPONENT);
    }

    logger.info("Script executed successfully in engine session", COMPONENT);
    Ok(EXIT_SUCCESS)
}

fn parse_execution_policy(policy: &str, logger: &CmTraceLogger) -> ExecutionPolicy {
    policy.parse().unwrap_or_else(|_| {
        logger.warning(
            &format!("Invalid execution policy: {policy}, using default"),
            COMPONENT,
        );
        ExecutionPolicy::Default
    })
}
