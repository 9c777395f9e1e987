// src/options.rs

//! Command-line parsing for the launcher.
//!
//! The accepted syntax mirrors the engine's own command line: flags start
//! with `-` or `/`, are matched case-insensitively, and some of them consume
//! the following token as their value. Parsing is total; malformed input
//! degrades to defaults instead of failing.

use std::path::PathBuf;

use crate::types::ExecutionMode;

/// Default payload timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// Everything the launcher needs to know about one run.
///
/// Built once by [`RunOptions::parse`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// `true` unless `-useprocess` was given.
    pub use_host: bool,
    pub script_path: Option<String>,
    pub script_arguments: Vec<String>,
    pub log_path: Option<PathBuf>,
    pub no_profile: bool,
    pub execution_policy: Option<String>,
    pub command: Option<String>,
    pub encoded_command: Option<String>,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub configuration_name: Option<String>,
    pub working_directory: Option<String>,
    pub mta: bool,
    /// Always positive.
    pub timeout_secs: u64,
    pub log_output_stream: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_host: true,
            script_path: None,
            script_arguments: Vec::new(),
            log_path: None,
            no_profile: false,
            execution_policy: None,
            command: None,
            encoded_command: None,
            input_format: None,
            output_format: None,
            configuration_name: None,
            working_directory: None,
            mta: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_output_stream: false,
        }
    }
}

/// What the engine is asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Script { path: String, args: Vec<String> },
    Command(String),
    /// Base64 of UTF-16LE script text, exactly as given on the command line.
    Encoded(String),
}

impl RunOptions {
    /// Parse a raw argument list (without the program name).
    pub fn parse<S: AsRef<str>>(args: &[S]) -> RunOptions {
        let mut options = RunOptions::default();
        let mut i = 0;

        while i < args.len() {
            let arg = args[i].as_ref();

            if !is_flag(arg) {
                if options.script_path.is_none() {
                    options.script_path = Some(arg.to_string());
                    options.script_arguments = args[i + 1..]
                        .iter()
                        .map(|a| a.as_ref().to_string())
                        .collect();
                    break;
                }
                i += 1;
                continue;
            }

            let name = arg[1..].to_lowercase();
            let next = args.get(i + 1).map(|a| a.as_ref().to_string());

            // Flags that take a value are a no-op when the value is missing.
            match name.as_str() {
                "useprocess" => options.use_host = false,
                "userunspace" => options.use_host = true,
                "noprofile" => options.no_profile = true,
                "mta" => options.mta = true,
                "logoutputstream" => options.log_output_stream = true,
                "logpath" => {
                    if let Some(v) = next {
                        options.log_path = Some(PathBuf::from(v));
                        i += 1;
                    }
                }
                "executionpolicy" | "ep" => {
                    if let Some(v) = next {
                        options.execution_policy = Some(v);
                        i += 1;
                    }
                }
                "command" | "c" => {
                    if let Some(v) = next {
                        options.command = Some(v);
                        i += 1;
                    }
                }
                "encodedcommand" | "e" | "ec" => {
                    if let Some(v) = next {
                        options.encoded_command = Some(v);
                        i += 1;
                    }
                }
                "file" | "f" => {
                    if let Some(v) = next {
                        options.script_path = Some(v);
                        i += 1;
                        // Greedy until the next flag-like token, so a script
                        // argument starting with '-' or '/' cannot be passed
                        // this way.
                        let mut script_args = Vec::new();
                        while let Some(a) = args.get(i + 1).map(|a| a.as_ref()) {
                            if is_flag(a) {
                                break;
                            }
                            script_args.push(a.to_string());
                            i += 1;
                        }
                        options.script_arguments = script_args;
                    }
                }
                "inputformat" | "if" => {
                    if let Some(v) = next {
                        options.input_format = Some(v);
                        i += 1;
                    }
                }
                "outputformat" | "of" => {
                    if let Some(v) = next {
                        options.output_format = Some(v);
                        i += 1;
                    }
                }
                "configurationname" | "config" => {
                    if let Some(v) = next {
                        options.configuration_name = Some(v);
                        i += 1;
                    }
                }
                "workingdirectory" | "wd" => {
                    if let Some(v) = next {
                        options.working_directory = Some(v);
                        i += 1;
                    }
                }
                "timeout" | "t" => {
                    if let Some(v) = next {
                        i += 1;
                        match v.trim().parse::<i64>() {
                            Ok(secs) if secs > 0 => options.timeout_secs = secs as u64,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }

            i += 1;
        }

        options
    }

    pub fn mode(&self) -> ExecutionMode {
        if self.use_host {
            ExecutionMode::Host
        } else {
            ExecutionMode::Process
        }
    }

    /// Resolve what to run: script path wins over an inline command, which
    /// wins over an encoded command. Empty strings count as unset.
    pub fn payload(&self) -> Option<Payload> {
        if let Some(path) = non_empty(&self.script_path) {
            return Some(Payload::Script {
                path: path.to_string(),
                args: self.script_arguments.clone(),
            });
        }
        if let Some(command) = non_empty(&self.command) {
            return Some(Payload::Command(command.to_string()));
        }
        non_empty(&self.encoded_command).map(|e| Payload::Encoded(e.to_string()))
    }
}

fn is_flag(arg: &str) -> bool {
    arg.starts_with('-') || arg.starts_with('/')
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
