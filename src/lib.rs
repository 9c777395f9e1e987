// src/lib.rs

pub mod cmtrace;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod options;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cmtrace::{CmTraceLogger, DEFAULT_MAX_SIZE_MB, LogSettings, Severity, default_log_path};
use crate::config::LauncherConfig;
use crate::errors::{EXIT_UNHANDLED, Result};
use crate::exec::{ExecutionStrategy, Strategy};
use crate::options::RunOptions;

const COMPONENT: &str = "Main";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - argument parsing
/// - config discovery
/// - the CMTrace log
/// - the selected execution strategy
///
/// Never fails: the return value is the process exit code.
pub async fn run(args: Vec<String>) -> i32 {
    let options = RunOptions::parse(&args);
    let log_path = options.log_path.clone();

    match run_inner(&args, options).await {
        Ok(code) => code,
        Err(err) => {
            report_unhandled(log_path, &err);
            EXIT_UNHANDLED
        }
    }
}

async fn run_inner(args: &[String], options: RunOptions) -> Result<i32> {
    let config = config::discover()?;
    debug!(?config, ?options, "launcher configured");

    let logger = Arc::new(CmTraceLogger::new(log_settings(&options, &config)));
    logger.info("QuietShell started", COMPONENT);
    logger.info(&format!("Command line: {}", args.join(" ")), COMPONENT);

    let strategy = ExecutionStrategy::for_options(&options, &config);
    let code = run_strategy(strategy, options, Arc::clone(&logger)).await;

    logger.info(
        &format!("QuietShell completed with exit code: {code}"),
        COMPONENT,
    );
    Ok(code)
}

/// Run `strategy` on its own task, so a panic inside it still ends in an
/// exit code and a log entry.
pub async fn run_strategy<S>(strategy: S, options: RunOptions, logger: Arc<CmTraceLogger>) -> i32
where
    S: Strategy + 'static,
{
    let task_logger = Arc::clone(&logger);
    let handle =
        tokio::spawn(async move { strategy.execute(&options, &task_logger).await });

    match handle.await {
        Ok(code) => code,
        Err(err) => {
            logger.error_with("Unhandled exception", COMPONENT, &err);
            EXIT_UNHANDLED
        }
    }
}

fn log_settings(options: &RunOptions, config: &LauncherConfig) -> LogSettings {
    let path = options
        .log_path
        .clone()
        .unwrap_or_else(|| default_log_path(config.log.directory.as_deref()));
    LogSettings::new(path, config.log.max_size_mb).with_max_backups(config.log.max_backups)
}

/// Last resort for failures before (or outside) a strategy: write to the
/// requested or default log, else to the console.
fn report_unhandled(log_path: Option<PathBuf>, err: &errors::QuietShellError) {
    let path = log_path.unwrap_or_else(|| default_log_path(None));
    let logger = CmTraceLogger::new(LogSettings::new(path, DEFAULT_MAX_SIZE_MB));
    let message = format!("Unhandled exception: {err:#}");
    if logger.try_log(&message, COMPONENT, Severity::Error).is_err() {
        println!("Fatal error: {err:#}");
    }
}
