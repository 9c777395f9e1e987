// src/exec/host/pwsh.rs

//! Production [`ScriptEngine`] backed by a private PowerShell worker.
//!
//! Each invocation runs in a `pwsh` worker that executes a small wrapper
//! script. The wrapper merges the error and warning streams into the output
//! pipeline and writes one tagged line per record on stdout:
//!
//! - `O:<base64>` output value, bare `O` for a null value
//! - `E:<base64>` error record
//! - `W:<base64>` warning message
//!
//! Payload text travels base64-encoded (UTF-8) so multi-line values and
//! arbitrary characters survive the pipe. Anything else the worker writes to
//! stdout (e.g. `Write-Host`) is not part of the result streams and is only
//! traced; stderr lines count as errors.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::process::{Child, Command};
use tracing::{debug, trace, warn};

use super::encoding::encode_command;
use super::engine::{HostSession, Invocation, InvocationResult, ScriptEngine, SessionSettings};
use crate::exec::BoxFuture;
use crate::exec::stream::for_each_line;
use crate::types::Apartment;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

const WRAPPER_PRELUDE: &str = r#"$ErrorActionPreference = 'Continue'
$ProgressPreference = 'SilentlyContinue'
if ($PSStyle) { $PSStyle.OutputRendering = 'PlainText' }
function Write-QsRecord($Record) {
    if ($null -eq $Record) { [Console]::Out.WriteLine('O'); return }
    $tag = 'O'
    $text = [string]$Record
    if ($Record -is [System.Management.Automation.ErrorRecord]) { $tag = 'E' }
    elseif ($Record -is [System.Management.Automation.WarningRecord]) { $tag = 'W'; $text = $Record.Message }
    [Console]::Out.WriteLine($tag + ':' + [Convert]::ToBase64String([System.Text.Encoding]::UTF8.GetBytes($text)))
}
"#;

/// Engine that runs sessions through `<executable> -EncodedCommand`.
#[derive(Debug, Clone)]
pub struct PwshEngine {
    executable: String,
}

impl PwshEngine {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }
}

impl ScriptEngine for PwshEngine {
    fn open_session<'a>(
        &'a self,
        settings: &'a SessionSettings,
    ) -> BoxFuture<'a, Result<Box<dyn HostSession>>> {
        Box::pin(async move {
            debug!(executable = %self.executable, ?settings, "opening engine session");
            let session: Box<dyn HostSession> = Box::new(PwshSession {
                executable: self.executable.clone(),
                settings: settings.clone(),
                location: None,
                worker: None,
            });
            Ok(session)
        })
    }
}

struct PwshSession {
    executable: String,
    settings: SessionSettings,
    /// Applied at the start of every invocation.
    location: Option<String>,
    /// Worker of the invocation in flight, kept here so `stop` can reach it
    /// after a timed-out `invoke` future has been dropped.
    worker: Option<Child>,
}

impl PwshSession {
    fn worker_arguments(&self, script: &str) -> Vec<String> {
        let mut args: Vec<String> = ["-NoLogo", "-NonInteractive", "-NoProfile"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(policy) = self.settings.execution_policy {
            args.push("-ExecutionPolicy".to_string());
            args.push(policy.as_str().to_string());
        }

        // Apartment switches only exist on Windows builds of the engine.
        if cfg!(windows) {
            args.push(
                match self.settings.apartment {
                    Apartment::Mta => "-MTA",
                    Apartment::Sta => "-STA",
                }
                .to_string(),
            );
        }

        args.push("-OutputFormat".to_string());
        args.push("Text".to_string());
        args.push("-EncodedCommand".to_string());
        args.push(encode_command(script));
        args
    }

    async fn run(&mut self, invocation: &Invocation) -> Result<InvocationResult> {
        let script = wrapper_script(self.location.as_deref(), invocation);

        let mut cmd = Command::new(&self.executable);
        cmd.args(self.worker_arguments(&script))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("starting engine worker '{}'", self.executable))?;
        debug!(pid = ?child.id(), "engine worker started");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        self.worker = Some(child);

        let mut result = InvocationResult::default();
        let mut stderr_lines = Vec::new();

        let read_records = async {
            if let Some(out) = stdout {
                for_each_line(out, |line| collect_record(line, &mut result)).await;
            }
        };
        let read_errors = async {
            if let Some(err) = stderr {
                for_each_line(err, |line| {
                    if !line.trim().is_empty() {
                        stderr_lines.push(line.to_string());
                    }
                })
                .await;
            }
        };
        tokio::join!(read_records, read_errors);

        let status = match self.worker.as_mut() {
            Some(child) => child.wait().await.context("waiting for engine worker")?,
            None => bail!("engine worker vanished while running"),
        };
        self.worker = None;

        result.errors.extend(stderr_lines);
        if !status.success() && !result.had_errors() {
            result.errors.push(format!(
                "engine worker exited with code {}",
                status.code().unwrap_or(-1)
            ));
        }
        Ok(result)
    }
}

impl HostSession for PwshSession {
    fn set_location<'a>(&'a mut self, path: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.location = Some(path.to_string());
            Ok(())
        })
    }

    fn invoke<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, Result<InvocationResult>> {
        Box::pin(self.run(invocation))
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(mut child) = self.worker.take() {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill engine worker");
                    return Err(e).context("killing engine worker");
                }
                debug!("engine worker stopped");
            }
            Ok(())
        })
    }
}

/// A decoded wrapper record.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Record {
    Output(Option<String>),
    Error(String),
    Warning(String),
}

fn decode_record(line: &str) -> Option<Record> {
    if line == "O" {
        return Some(Record::Output(None));
    }
    let (tag, payload) = line.split_once(':')?;
    let bytes = STANDARD.decode(payload).ok()?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    match tag {
        "O" => Some(Record::Output(Some(text))),
        "E" => Some(Record::Error(text)),
        "W" => Some(Record::Warning(text)),
        _ => None,
    }
}

fn collect_record(line: &str, result: &mut InvocationResult) {
    match decode_record(line) {
        Some(Record::Output(value)) => result.output.push(value),
        Some(Record::Error(text)) => result.errors.push(text),
        Some(Record::Warning(text)) => result.warnings.push(text),
        None => trace!(line, "ignoring non-record worker output"),
    }
}

/// Single-quoted engine string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build the script the worker runs for `invocation`.
fn wrapper_script(location: Option<&str>, invocation: &Invocation) -> String {
    let mut script = String::from(WRAPPER_PRELUDE);

    if let Some(dir) = location {
        script.push_str(&format!("$null = Set-Location -LiteralPath {}\n", quote_literal(dir)));
    }

    let body = match invocation {
        Invocation::Script { path, args } => {
            let mut call = format!("& {}", quote_literal(path));
            for arg in args {
                call.push(' ');
                call.push_str(&quote_literal(arg));
            }
            call
        }
        Invocation::Text(text) => text.clone(),
    };

    script.push_str("& {\n");
    script.push_str(&body);
    script.push_str("\n} 2>&1 3>&1 | ForEach-Object { Write-QsRecord $_ }\n");
    script
}
