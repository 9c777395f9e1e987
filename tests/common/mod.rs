#![allow(dead_code)]
#![allow(unused_imports)]

pub use quietshell_test_utils::builders;
pub use quietshell_test_utils::clock::SteppingClock;
pub use quietshell_test_utils::fake_engine::FakeEngine;
pub use quietshell_test_utils::log_reader::{LogLine, read_log, read_messages};
pub use quietshell_test_utils::{init_tracing, with_timeout};

use std::path::Path;
use std::sync::Arc;

use quietshell::cmtrace::{CmTraceLogger, LogSettings};

/// A logger writing `QuietShell.log` into `dir` with default rotation.
pub fn logger_in(dir: &Path) -> Arc<CmTraceLogger> {
    Arc::new(CmTraceLogger::new(LogSettings::new(
        dir.join("QuietShell.log"),
        2,
    )))
}

/// True when some logged message contains `needle`.
pub fn log_contains(path: &Path, needle: &str) -> bool {
    read_messages(path).iter().any(|m| m.contains(needle))
}
