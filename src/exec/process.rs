// src/exec/process.rs

//! External-process strategy: spawn the engine executable and wait for it.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cmtrace::{CmTraceLogger, Severity};
use crate::errors::{EXIT_UNHANDLED, QuietShellError, Result};
use crate::exec::cmdline::{build_arguments, join_quoted};
use crate::exec::stream::LineReader;
use crate::exec::{BoxFuture, Strategy, finish, resolve_payload};
use crate::options::RunOptions;

const COMPONENT: &str = "ProcessStrategy";

/// How long to keep draining output after the child has exited.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Captured lines waiting for the log writer.
const LINE_QUEUE: usize = 256;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs the payload through `<executable> -NoLogo -NonInteractive ...`.
#[derive(Debug, Clone)]
pub struct ProcessStrategy {
    executable: String,
}

impl ProcessStrategy {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    async fn run(&self, options: &RunOptions, logger: &Arc<CmTraceLogger>) -> Result<i32> {
        logger.info("Starting engine process execution", COMPONENT);

        let payload = resolve_payload(options)?;
        let args = build_arguments(options, &payload);
        let command_line = join_quoted(&args);

        let mut cmd = Command::new(&self.executable);

        #[cfg(windows)]
        {
            cmd.raw_arg(&command_line);
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        #[cfg(not(windows))]
        cmd.args(&args);

        if let Some(dir) = options.working_directory.as_deref().filter(|d| !d.is_empty()) {
            cmd.current_dir(dir);
        }

        // Stdout is only captured when it is going to be logged.
        let stdout = if options.log_output_stream {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };
        cmd.stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        logger.info(
            &format!("Starting engine process: {} {}", self.executable, command_line),
            COMPONENT,
        );
        debug!(executable = %self.executable, ?args, "spawning engine process");

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning engine process '{}'", self.executable))?;

        // Readers only queue lines; file appends happen on a blocking thread.
        let (line_tx, line_rx) = mpsc::channel(LINE_QUEUE);
        let writer = spawn_line_writer(line_rx, Arc::clone(logger));
        let mut readers = Vec::new();
        if let Some(out) = child.stdout.take() {
            readers.push(spawn_reader(out, "Output", Severity::Info, line_tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(spawn_reader(err, "Error", Severity::Error, line_tx.clone()));
        }
        drop(line_tx);

        let limit = Duration::from_secs(options.timeout_secs);
        let outcome = tokio::time::timeout(limit, child.wait()).await;
        let status = match outcome {
            Ok(status) => status.context("waiting for engine process")?,
            Err(_) => {
                logger.error(
                    &format!(
                        "Engine process timed out after {} seconds",
                        options.timeout_secs
                    ),
                    COMPONENT,
                );
                info!(timeout_secs = options.timeout_secs, "killing timed-out engine process");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed-out engine process");
                }
                return Err(QuietShellError::TimedOut(options.timeout_secs));
            }
        };

        for reader in readers {
            if tokio::time::timeout(DRAIN_GRACE, reader).await.is_err() {
                debug!("output reader still busy after child exit; leaving it behind");
            }
        }
        if tokio::time::timeout(DRAIN_GRACE, writer).await.is_err() {
            debug!("log writer still busy after child exit; leaving it behind");
        }

        let code = status.code().unwrap_or(EXIT_UNHANDLED);
        logger.info(
            &format!("Engine process completed with exit code: {code}"),
            COMPONENT,
        );
        Ok(code)
    }
}

impl Strategy for ProcessStrategy {
    fn execute<'a>(
        &'a self,
        options: &'a RunOptions,
        logger: &'a Arc<CmTraceLogger>,
    ) -> BoxFuture<'a, i32> {
        Box::pin(async move {
            let result = self.run(options, logger).await;
            finish(result, logger, COMPONENT, "Process execution failed")
        })
    }
}

/// Forward each non-empty line of `stream` as `<label>: <line>`.
fn spawn_reader<R>(
    stream: R,
    label: &'static str,
    severity: Severity,
    lines: mpsc::Sender<(String, Severity)>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = LineReader::new(stream);
        while let Some(line) = reader.next_line().await {
            if line.is_empty() {
                continue;
            }
            if lines.send((format!("{label}: {line}"), severity)).await.is_err() {
                break;
            }
        }
    })
}

/// Append queued lines to the log until every sender is gone.
fn spawn_line_writer(
    mut lines: mpsc::Receiver<(String, Severity)>,
    logger: Arc<CmTraceLogger>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while let Some((message, severity)) = lines.blocking_recv() {
            logger.log(&message, COMPONENT, severity);
        }
    })
}
