//! Line-oriented reading with a running line number
use std::io::{self, BufRead};

/// Forward-only, line-oriented reader over a dump stream.
///
/// The cursor never rewinds. Each successful [`next_line`](Self::next_line)
/// consumes exactly one line including its terminator.
pub struct LineCursor<R: BufRead> {
    reader: R,
    buf: String,
    line: u64,
}

impl<R: BufRead> LineCursor<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::with_capacity(256),
            line: 0,
        }
    }

    /// Read the next line, stripped of its `\n` or `\r\n` terminator.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    pub fn next_line(&mut self) -> io::Result<Option<&str>> {
        self.buf.clear();
        let read = self.reader.read_line(&mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        let content = self
            .buf
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(&self.buf);
        Ok(Some(content))
    }

    /// Consume `n` lines without looking at them.
    ///
    /// Returns the number of lines actually skipped, which is smaller than
    /// `n` only when the stream ends first.
    pub fn skip_lines(&mut self, n: usize) -> io::Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                break;
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.reader.consume(pos + 1);
                    skipped += 1;
                    self.line += 1;
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                    // A final line without terminator still counts once the stream ends.
                    if self.reader.fill_buf()?.is_empty() {
                        skipped += 1;
                        self.line += 1;
                    }
                }
            }
        }
        Ok(skipped)
    }

    /// Check whether the stream is exhausted without consuming anything
    pub fn at_end(&mut self) -> io::Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> u64 {
        self.line
    }
}
