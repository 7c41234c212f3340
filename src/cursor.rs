//! Forward-only byte reader with bounded lookahead.
//!
//! [`ByteCursor`] wraps any [`io::Read`] source (byte slices included) and keeps a
//! small buffer so the grammar can peek a couple of bytes before committing. Bytes
//! behind the read position are discarded once the buffer grows, keeping memory
//! bounded for streaming sources; a short tail is retained for error context.
//!
//! ```rust
//! use serde_php::ByteCursor;
//!
//! let mut cursor = ByteCursor::from_slice(b"s:3:\"abc\";");
//! assert_eq!(cursor.peek().unwrap(), Some(b's'));
//! assert_eq!(cursor.read(2).unwrap(), b"s:".to_vec());
//! assert_eq!(cursor.position(), 2);
//! assert!(cursor.read(100).is_err());
//! assert_eq!(cursor.position(), 2);
//! ```

use crate::error::{context_window, CONTEXT_RADIUS};
use crate::{Error, Result};
use std::io::{self, Read};

const CHUNK: usize = 8 * 1024;
const COMPACT_THRESHOLD: usize = 64 * 1024;

/// A position-tracked reader over a byte source.
pub struct ByteCursor<R> {
    source: R,
    buf: Vec<u8>,
    head: usize,
    // absolute offset of buf[0]
    base: usize,
    exhausted: bool,
}

impl<'a> ByteCursor<&'a [u8]> {
    /// Creates a cursor over an in-memory buffer.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        ByteCursor::new(bytes)
    }
}

impl<R: Read> ByteCursor<R> {
    pub fn new(source: R) -> Self {
        ByteCursor {
            source,
            buf: Vec::new(),
            head: 0,
            base: 0,
            exhausted: false,
        }
    }

    /// Absolute offset of the next byte to be read.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.head
    }

    /// Returns `true` once every byte of the source has been consumed.
    pub fn at_end(&mut self) -> Result<bool> {
        Ok(!self.fill(1)?)
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        self.peek_at(0)
    }

    /// Returns the byte `ahead` positions past the cursor without consuming anything.
    pub fn peek_at(&mut self, ahead: usize) -> Result<Option<u8>> {
        if self.fill(ahead + 1)? {
            Ok(Some(self.buf[self.head + ahead]))
        } else {
            Ok(None)
        }
    }

    /// Consumes one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        if !self.fill(1)? {
            return Err(self.end_of_input(1));
        }
        let b = self.buf[self.head];
        self.head += 1;
        Ok(b)
    }

    /// Consumes exactly `n` bytes.
    ///
    /// On failure nothing is consumed.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        if !self.fill(n)? {
            return Err(self.end_of_input(n));
        }
        let out = self.buf[self.head..self.head + n].to_vec();
        self.head += n;
        Ok(out)
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn read_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(b) = self.peek()? {
            if !pred(b) {
                break;
            }
            out.push(b);
            self.head += 1;
        }
        Ok(out)
    }

    /// Skips `n` bytes that were already peeked.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if !self.fill(n)? {
            return Err(self.end_of_input(n));
        }
        self.head += n;
        Ok(())
    }

    /// Diagnostic excerpt around an absolute `offset`, limited to what is still buffered.
    #[must_use]
    pub fn context(&self, offset: usize) -> String {
        context_window(&self.buf, self.base, offset)
    }

    /// Builds a parse error at `offset` with context from the buffer.
    pub(crate) fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::parse_with_context(offset, message, self.context(offset))
    }

    fn end_of_input(&self, needed: usize) -> Error {
        let available = self.buf.len() - self.head;
        self.error_at(
            self.position() + available,
            format!(
                "Unexpected end of input, needed {} more byte(s) at offset #{}",
                needed - available,
                self.position()
            ),
        )
    }

    // Ensures at least `n` unread bytes are buffered; returns false on a short source.
    fn fill(&mut self, n: usize) -> Result<bool> {
        while self.buf.len() - self.head < n {
            if self.exhausted {
                return Ok(false);
            }
            self.compact();
            let mut chunk = [0u8; CHUNK];
            match self.source.read(&mut chunk) {
                Ok(0) => self.exhausted = true,
                Ok(read) => self.buf.extend_from_slice(&chunk[..read]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::from(e)),
            }
        }
        Ok(true)
    }

    fn compact(&mut self) {
        if self.head < COMPACT_THRESHOLD {
            return;
        }
        let drop = self.head - CONTEXT_RADIUS;
        self.buf.drain(..drop);
        self.base += drop;
        self.head -= drop;
    }
}
