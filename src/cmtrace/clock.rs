// src/cmtrace/clock.rs

use std::fmt::Debug;

use chrono::{DateTime, Local};

/// Source of local wall-clock time for entries and backup names.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Local>;
}

/// The real local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
