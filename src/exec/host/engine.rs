// src/exec/host/engine.rs

//! The seam between the host strategy and a scripting engine.
//!
//! The strategy only needs a session it can configure, run one invocation
//! on, and stop. Production uses [`super::pwsh::PwshEngine`]; tests plug in
//! fakes that never touch a real engine.

use std::fmt::Debug;

use anyhow::Result;

use crate::exec::BoxFuture;
use crate::types::{Apartment, ExecutionPolicy};

/// How a session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// `None` leaves the engine's own policy untouched.
    pub execution_policy: Option<ExecutionPolicy>,
    pub apartment: Apartment,
    /// Run every invocation of the session on the same engine thread.
    pub reuse_thread: bool,
}

/// What a session is asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run a script file with positional arguments.
    Script { path: String, args: Vec<String> },
    /// Run script text.
    Text(String),
}

/// Streams collected from one completed invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// Pipeline output in order; `None` for null values.
    pub output: Vec<Option<String>>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl InvocationResult {
    pub fn had_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Factory for engine sessions.
pub trait ScriptEngine: Send + Sync + Debug {
    fn open_session<'a>(
        &'a self,
        settings: &'a SessionSettings,
    ) -> BoxFuture<'a, Result<Box<dyn HostSession>>>;
}

/// An open engine session.
///
/// `invoke` may be dropped before completion (timeout); `stop` must then
/// cancel whatever the dropped invocation left running.
pub trait HostSession: Send {
    /// Change the session's current location. Output is discarded.
    fn set_location<'a>(&'a mut self, path: &'a str) -> BoxFuture<'a, Result<()>>;

    fn invoke<'a>(&'a mut self, invocation: &'a Invocation)
    -> BoxFuture<'a, Result<InvocationResult>>;

    fn stop(&mut self) -> BoxFuture<'_, Result<()>>;
}
