use std::fs;
use std::path::Path;

/// One parsed CMTrace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Message as written, i.e. still XML-escaped.
    pub message: String,
    pub time: String,
    pub date: String,
    pub component: String,
    pub severity: u8,
    pub thread: u64,
}

/// Parse `<![LOG[msg]LOG]!><time="..." date="..." component="..." ...>`.
pub fn parse_line(line: &str) -> Option<LogLine> {
    let rest = line.strip_prefix("<![LOG[")?;
    let (message, attrs) = rest.split_once("]LOG]!><")?;
    let attrs = attrs.strip_suffix('>')?;

    Some(LogLine {
        message: message.to_string(),
        time: attribute(attrs, "time")?,
        date: attribute(attrs, "date")?,
        component: attribute(attrs, "component")?,
        severity: attribute(attrs, "type")?.parse().ok()?,
        thread: attribute(attrs, "thread")?.parse().ok()?,
    })
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    let start = attrs.find(&format!("{name}=\""))? + name.len() + 2;
    let len = attrs[start..].find('"')?;
    Some(attrs[start..start + len].to_string())
}

/// All lines of a log file. Panics on a missing file or a malformed line.
pub fn read_log(path: &Path) -> Vec<LogLine> {
    let contents = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading log {}: {e}", path.display()));
    contents
        .lines()
        .map(|l| parse_line(l).unwrap_or_else(|| panic!("malformed log line: {l:?}")))
        .collect()
}

/// Messages of all lines, in order.
pub fn read_messages(path: &Path) -> Vec<String> {
    read_log(path).into_iter().map(|l| l.message).collect()
}
