// src/cmtrace/entry.rs

//! A single CMTrace log line.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};

/// Severity of an entry as CMTrace understands it (`type="1|2|3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One formatted entry. Constructed once and only rendered afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    message: String,
    time: String,
    date: String,
    component: String,
    context: String,
    severity: Severity,
    thread: u64,
}

impl LogEntry {
    /// Build an entry stamped at `now` for the calling thread.
    pub fn new(message: &str, component: &str, severity: Severity, now: DateTime<Local>) -> Self {
        Self {
            message: escape_xml(message),
            time: now.format("%H:%M:%S%.6f").to_string(),
            date: now.format("%-m-%-d-%Y").to_string(),
            component: component.to_string(),
            context: current_context(),
            severity,
            thread: current_thread_number(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Message text after escaping.
    pub fn escaped_message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<![LOG[{}]LOG]!><time=\"{}\" date=\"{}\" component=\"{}\" context=\"{}\" type=\"{}\" thread=\"{}\" file=\"\">",
            self.message,
            self.time,
            self.date,
            self.component,
            self.context,
            self.severity.code(),
            self.thread,
        )
    }
}

/// Escape the five XML special characters. `&` goes first so the entities
/// produced for the others are not escaped twice.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Identity of the user running the launcher, or `Unknown`.
fn current_context() -> String {
    let user = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .ok()
        .filter(|u| !u.is_empty());

    match (std::env::var("USERDOMAIN").ok().filter(|d| !d.is_empty()), user) {
        (Some(domain), Some(user)) if cfg!(windows) => format!("{domain}\\{user}"),
        (_, Some(user)) => user,
        (_, None) => "Unknown".to_string(),
    }
}

static NEXT_THREAD_NUMBER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_NUMBER: Cell<u64> = const { Cell::new(0) };
}

/// Small sequential id for the calling OS thread, assigned on first use.
fn current_thread_number() -> u64 {
    THREAD_NUMBER.with(|n| {
        if n.get() == 0 {
            n.set(NEXT_THREAD_NUMBER.fetch_add(1, Ordering::Relaxed));
        }
        n.get()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 3)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn escape_handles_ampersand_first() {
        assert_eq!(escape_xml("a & <b>"), "a &amp; &lt;b&gt;");
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
        assert_eq!(escape_xml("\"it's\""), "&quot;it&apos;s&quot;");
        assert_eq!(escape_xml(""), "");
    }

    #[test]
    fn line_has_cmtrace_layout() {
        let entry = LogEntry::new("hello <world>", "Main", Severity::Warning, fixed_time());
        let line = entry.to_string();

        assert!(line.starts_with("<![LOG[hello &lt;world&gt;]LOG]!><time=\"09:05:03.000000\""));
        assert!(line.contains(" date=\"3-7-2024\" "));
        assert!(line.contains(" component=\"Main\" "));
        assert!(line.contains(" type=\"2\" "));
        assert!(line.ends_with(" file=\"\">"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn entry_keeps_severity_and_escaped_message() {
        let entry = LogEntry::new("a & 'b'", "Runner", Severity::Error, fixed_time());
        assert_eq!(entry.severity(), Severity::Error);
        assert_eq!(entry.escaped_message(), "a &amp; &apos;b&apos;");
    }

    #[test]
    fn thread_number_is_stable_per_thread() {
        let a = current_thread_number();
        let b = current_thread_number();
        assert_eq!(a, b);

        let other = std::thread::spawn(current_thread_number)
            .join()
            .expect("thread panicked");
        assert_ne!(a, other);
    }

    #[test]
    fn severity_codes() {
        assert_eq!(Severity::Info.code(), 1);
        assert_eq!(Severity::Warning.code(), 2);
        assert_eq!(Severity::Error.code(), 3);
    }
}
