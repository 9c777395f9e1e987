use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, TimeZone};
use quietshell::cmtrace::Clock;

/// A clock that moves forward by a fixed step on every reading, so backups
/// taken in quick succession still get distinct names.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Local>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Local>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// One-second steps from a fixed winter date (no DST transition nearby).
    pub fn per_second() -> Self {
        let start = Local
            .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
            .earliest()
            .expect("valid local start time");
        Self::new(start, Duration::seconds(1))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + self.step;
        now
    }
}
