#![allow(dead_code)]

use std::path::{Path, PathBuf};

use quietshell::options::RunOptions;

/// Builder for `RunOptions` to simplify test setup.
///
/// Starts from the parser defaults: host mode, 1800 s timeout, no payload.
pub struct RunOptionsBuilder {
    options: RunOptions,
}

impl RunOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: RunOptions::default(),
        }
    }

    pub fn process(mut self) -> Self {
        self.options.use_host = false;
        self
    }

    pub fn script(mut self, path: impl AsRef<Path>, args: &[&str]) -> Self {
        self.options.script_path = Some(path.as_ref().to_string_lossy().into_owned());
        self.options.script_arguments = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn command(mut self, text: &str) -> Self {
        self.options.command = Some(text.to_string());
        self
    }

    pub fn encoded_command(mut self, encoded: &str) -> Self {
        self.options.encoded_command = Some(encoded.to_string());
        self
    }

    pub fn execution_policy(mut self, policy: &str) -> Self {
        self.options.execution_policy = Some(policy.to_string());
        self
    }

    pub fn working_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.options.working_directory = Some(dir.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.log_path = Some(path.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.options.timeout_secs = secs;
        self
    }

    pub fn mta(mut self) -> Self {
        self.options.mta = true;
        self
    }

    pub fn no_profile(mut self) -> Self {
        self.options.no_profile = true;
        self
    }

    pub fn log_output(mut self) -> Self {
        self.options.log_output_stream = true;
        self
    }

    pub fn build(self) -> RunOptions {
        self.options
    }
}

impl Default for RunOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
