// src/exec/stream.rs

//! Line-by-line reading of child process pipes.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Longest line handed to a callback; longer lines arrive in pieces.
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

/// Reads a child pipe one line at a time.
///
/// Invalid UTF-8 is replaced rather than ending the read, so the pipe keeps
/// being drained and the child never blocks on a full buffer. Trailing
/// `\r\n` / `\n` are stripped. A line longer than the cap is returned as
/// consecutive pieces of at most that many bytes.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    max_line: u64,
    /// Last piece was cut at the cap, not at a newline.
    continued: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(stream: R) -> Self {
        Self::with_cap(stream, MAX_LINE_BYTES)
    }

    pub fn with_cap(stream: R, max_line: u64) -> Self {
        Self {
            reader: BufReader::new(stream),
            buf: Vec::new(),
            max_line: max_line.max(1),
            continued: false,
        }
    }

    /// The next line, or `None` at EOF or on a read error.
    pub async fn next_line(&mut self) -> Option<String> {
        loop {
            self.buf.clear();
            let read = (&mut self.reader)
                .take(self.max_line)
                .read_until(b'\n', &mut self.buf)
                .await;
            match read {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    let complete = self.buf.ends_with(b"\n");
                    let was_continued = std::mem::replace(&mut self.continued, !complete);
                    let text = String::from_utf8_lossy(&self.buf);
                    let line = text.trim_end_matches(['\r', '\n']);
                    // The newline that ends a cut line is not a line of its own.
                    if was_continued && complete && line.is_empty() {
                        continue;
                    }
                    return Some(line.to_string());
                }
            }
        }
    }
}

/// Call `on_line` for every line of `stream` until EOF.
pub async fn for_each_line<R, F>(stream: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut lines = LineReader::new(stream);
    while let Some(line) = lines.next_line().await {
        on_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_lines_and_strips_endings() {
        let input: &[u8] = b"one\r\ntwo\n\nthree";
        let mut seen = Vec::new();
        for_each_line(input, |l| seen.push(l.to_string())).await;
        assert_eq!(seen, vec!["one", "two", "", "three"]);
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_stop_reading() {
        let input: &[u8] = b"bad \xff byte\nnext\n";
        let mut seen = Vec::new();
        for_each_line(input, |l| seen.push(l.to_string())).await;
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("bad "));
        assert_eq!(seen[1], "next");
    }

    #[tokio::test]
    async fn overlong_lines_arrive_in_pieces() {
        let input: &[u8] = b"abcdefghij\nabcd\nxy";
        let mut lines = LineReader::with_cap(input, 4);
        let mut seen = Vec::new();
        while let Some(line) = lines.next_line().await {
            seen.push(line);
        }
        assert_eq!(seen, vec!["abcd", "efgh", "ij", "abcd", "xy"]);
    }

    #[tokio::test]
    async fn default_cap_bounds_an_endless_line() {
        let input = vec![b'x'; MAX_LINE_BYTES as usize * 2 + 5];
        let mut lengths = Vec::new();
        for_each_line(input.as_slice(), |l| lengths.push(l.len())).await;
        assert_eq!(
            lengths,
            vec![MAX_LINE_BYTES as usize, MAX_LINE_BYTES as usize, 5]
        );
    }
}
