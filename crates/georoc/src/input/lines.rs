//! Line-level access to Windows-1252 encoded source tables.

use std::io::{self, BufRead, Read};

use encoding_rs::WINDOWS_1252;

/// Non-blank, trimmed lines of a Windows-1252 encoded stream.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Lines are decoded one at a
/// time; the stream is never buffered as a whole.
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    after_cr: bool,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            after_cr: false,
        }
    }

    /// Read the next raw line into `buf`, without its terminator.
    ///
    /// Returns `false` at end of stream.
    fn read_line(&mut self) -> io::Result<bool> {
        self.buf.clear();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(!self.buf.is_empty());
            }
            // The LF of a CRLF pair split across reads.
            if self.after_cr {
                self.after_cr = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    self.buf.extend_from_slice(&available[..end]);
                    self.after_cr = available[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Ok(true);
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_line() {
                Ok(false) => return None,
                Ok(true) => {
                    let (text, _) = WINDOWS_1252.decode_without_bom_handling(&self.buf);
                    let line = text.trim();
                    if !line.is_empty() {
                        return Some(Ok(line.to_string()));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// The CSV body of a source table as a UTF-8 byte stream.
///
/// Yields the lines of the underlying [`Lines`] up to, but excluding, the
/// first line for which `is_end` returns true.
pub struct TableBody<R, F> {
    lines: Lines<R>,
    is_end: F,
    pending: Vec<u8>,
    pos: usize,
    done: bool,
}

impl<R, F> TableBody<R, F>
where
    R: BufRead,
    F: FnMut(&str) -> bool,
{
    pub fn new(lines: Lines<R>, is_end: F) -> Self {
        Self {
            lines,
            is_end,
            pending: Vec::new(),
            pos: 0,
            done: false,
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        match self.lines.next() {
            Some(Ok(line)) if !(self.is_end)(&line) => {
                self.pending = line.into_bytes();
                self.pending.push(b'\n');
                self.pos = 0;
            }
            Some(Err(e)) => return Err(e),
            _ => self.done = true,
        }
        Ok(())
    }
}

impl<R, F> Read for TableBody<R, F>
where
    R: BufRead,
    F: FnMut(&str) -> bool,
{
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.pending.len() {
            if self.done {
                return Ok(0);
            }
            self.refill()?;
        }
        let n = out.len().min(self.pending.len() - self.pos);
        out[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_blank_and_trim() {
        let data = b"a,b\r\n\r\n  c,d  \n\n";
        let lines: Vec<String> = Lines::new(&data[..]).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["a,b", "c,d"]);
    }

    #[test]
    fn test_lines_decode_windows_1252() {
        // 0xB0 is the degree sign, 0xE9 is e-acute
        let data = b"45\xb0N,Ant\xe9rieur\n";
        let lines: Vec<String> = Lines::new(&data[..]).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["45°N,Antérieur"]);
    }

    #[test]
    fn test_lines_split_on_carriage_returns() {
        let data = b"a,b\rc,d\r\re,f\r\ng,h";
        let lines: Vec<String> = Lines::new(&data[..]).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["a,b", "c,d", "e,f", "g,h"]);
    }

    #[test]
    fn test_lines_crlf_across_buffer_boundary() {
        let data = b"one\r\ntwo\r\n";
        let reader = io::BufReader::with_capacity(4, &data[..]);
        let mut lines = Lines::new(reader);
        assert_eq!(lines.next().unwrap().unwrap(), "one");
        assert_eq!(lines.next().unwrap().unwrap(), "two");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_table_body_stops_at_marker_with_cr_endings() {
        let data = b"h1,h2\r1,2\rReferences:\r[1] Smith\r";
        let mut body = TableBody::new(Lines::new(&data[..]), |l: &str| l.starts_with("References:"));
        let mut text = String::new();
        body.read_to_string(&mut text).unwrap();
        assert_eq!(text, "h1,h2\n1,2\n");
    }

    #[test]
    fn test_lines_without_trailing_newline() {
        let data = b"one\ntwo";
        let lines: Vec<String> = Lines::new(&data[..]).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_table_body_stops_at_marker() {
        let data = b"h1,h2\n1,2\n\nReferences:\n[1] Smith\n";
        let mut body = TableBody::new(Lines::new(&data[..]), |l: &str| l.starts_with("References:"));
        let mut text = String::new();
        body.read_to_string(&mut text).unwrap();
        assert_eq!(text, "h1,h2\n1,2\n");
    }

    #[test]
    fn test_table_body_small_reads() {
        let data = b"abc\ndef\n";
        let mut body = TableBody::new(Lines::new(&data[..]), |_: &str| false);
        let mut buf = [0u8; 2];
        let mut out = Vec::new();
        loop {
            let n = body.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"abc\ndef\n");
    }
}
