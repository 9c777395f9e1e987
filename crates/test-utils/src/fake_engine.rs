use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use quietshell::exec::BoxFuture;
use quietshell::exec::host::{
    HostSession, Invocation, InvocationResult, ScriptEngine, SessionSettings,
};

/// What every invocation on a [`FakeEngine`] session does.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Finish immediately with this result.
    Complete(InvocationResult),
    /// Never finish; only a timeout ends it.
    Hang,
    /// Fail with this message, as a broken engine would.
    Fail(String),
}

/// Everything the strategy asked of the engine.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub opened: Vec<SessionSettings>,
    pub locations: Vec<String>,
    pub invocations: Vec<Invocation>,
    pub stops: usize,
}

/// A fake engine that:
/// - records sessions opened, locations set, invocations and stops
/// - answers every invocation according to its [`Behaviour`].
#[derive(Debug, Clone)]
pub struct FakeEngine {
    behaviour: Behaviour,
    calls: Arc<Mutex<Calls>>,
}

impl FakeEngine {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn completing(result: InvocationResult) -> Self {
        Self::new(Behaviour::Complete(result))
    }

    pub fn hanging() -> Self {
        Self::new(Behaviour::Hang)
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Behaviour::Fail(message.to_string()))
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.calls.lock().unwrap().opened.len()
    }

    pub fn stop_count(&self) -> usize {
        self.calls.lock().unwrap().stops
    }
}

impl ScriptEngine for FakeEngine {
    fn open_session<'a>(
        &'a self,
        settings: &'a SessionSettings,
    ) -> BoxFuture<'a, Result<Box<dyn HostSession>>> {
        Box::pin(async move {
            self.calls.lock().unwrap().opened.push(settings.clone());
            let session: Box<dyn HostSession> = Box::new(FakeSession {
                behaviour: self.behaviour.clone(),
                calls: Arc::clone(&self.calls),
            });
            Ok(session)
        })
    }
}

struct FakeSession {
    behaviour: Behaviour,
    calls: Arc<Mutex<Calls>>,
}

impl HostSession for FakeSession {
    fn set_location<'a>(&'a mut self, path: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls.lock().unwrap().locations.push(path.to_string());
            Ok(())
        })
    }

    fn invoke<'a>(
        &'a mut self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, Result<InvocationResult>> {
        Box::pin(async move {
            self.calls.lock().unwrap().invocations.push(invocation.clone());
            match &self.behaviour {
                Behaviour::Complete(result) => Ok(result.clone()),
                Behaviour::Hang => std::future::pending::<Result<InvocationResult>>().await,
                Behaviour::Fail(message) => Err(anyhow!("{message}")),
            }
        })
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.calls.lock().unwrap().stops += 1;
            Ok(())
        })
    }
}
