//! Reply framer
//!
//! Turns an arbitrarily chunked byte stream into reply units.
//!
//! ## Modes
//! - **Line**: split on CRLF, yielding [`Frame::Line`] without the CRLF.
//! - **Bulk**: entered through [`Framer::expect_bulk`] after a `VALUE` line.
//!   Exactly `len` bytes are taken as payload without inspecting them, so
//!   values may contain CRLF or `END\r\n`. The payload must be followed by
//!   CRLF and then an `END` line; only then is [`Frame::Bulk`] yielded and
//!   the framer returns to line mode.
//!
//! ```text
//! VALUE key 0 5\r\n        <- Line
//! a\r\nb\r\n               <- 5 payload bytes + CRLF
//! END\r\n                  <- terminator, consumed with the payload
//! ```

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{McError, Result};

/// Longest reply line accepted before giving up on finding its CRLF
pub const MAX_LINE_LEN: usize = 8 * 1024;

const CRLF: &[u8] = b"\r\n";
const TERMINATOR: &[u8] = b"END";

/// A decoded reply unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Line(Bytes),
    Bulk(Bytes),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Line,
    Bulk { len: usize },
}

/// Incremental reply framer
#[derive(Debug)]
pub struct Framer {
    buf: BytesMut,
    mode: Mode,
}

impl Framer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(4096),
            mode: Mode::Line,
        }
    }

    /// Append bytes read from the transport
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Treat the next `len` bytes as a value payload
    pub fn expect_bulk(&mut self, len: usize) {
        self.mode = Mode::Bulk { len };
    }

    pub fn in_bulk(&self) -> bool {
        matches!(self.mode, Mode::Bulk { .. })
    }

    /// Bytes received but not yet framed
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Discard buffered bytes and return to line mode
    pub fn reset(&mut self) {
        self.buf.clear();
        self.mode = Mode::Line;
    }

    /// Next complete unit, or `None` if more bytes are needed
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.mode {
            Mode::Line => self.next_line(),
            Mode::Bulk { len } => self.next_bulk(len),
        }
    }

    fn next_line(&mut self) -> Result<Option<Frame>> {
        match find_line_end(&self.buf)? {
            Some(end) => {
                let line = self.buf.split_to(end).freeze();
                self.buf.advance(CRLF.len());
                Ok(Some(Frame::Line(line)))
            }
            None => Ok(None),
        }
    }

    fn next_bulk(&mut self, len: usize) -> Result<Option<Frame>> {
        // Payload bytes are counted, never scanned.
        let data_end = match len.checked_add(CRLF.len()) {
            Some(end) => end,
            None => return Err(McError::Framing(format!("value length {} overflows", len))),
        };
        if self.buf.len() < data_end {
            return Ok(None);
        }
        if &self.buf[len..data_end] != CRLF {
            return Err(McError::Framing(format!(
                "value of {} bytes is not followed by CRLF",
                len
            )));
        }

        let trailer = &self.buf[data_end..];
        let end = match find_line_end(trailer)? {
            Some(end) => end,
            None => return Ok(None),
        };
        if !trailer[..end].eq_ignore_ascii_case(TERMINATOR) {
            return Err(McError::Framing(format!(
                "expected END after value, got {:?}",
                String::from_utf8_lossy(&trailer[..end])
            )));
        }

        let payload = self.buf.split_to(len).freeze();
        self.buf.advance(CRLF.len() + end + CRLF.len());
        self.mode = Mode::Line;
        Ok(Some(Frame::Bulk(payload)))
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of the first CRLF, erroring once a line grows past `MAX_LINE_LEN`
fn find_line_end(buf: &[u8]) -> Result<Option<usize>> {
    match buf.windows(CRLF.len()).position(|w| w == CRLF) {
        Some(end) if end <= MAX_LINE_LEN => Ok(Some(end)),
        None if buf.len() <= MAX_LINE_LEN + CRLF.len() => Ok(None),
        _ => Err(McError::Framing(format!(
            "no line terminator within {} bytes",
            MAX_LINE_LEN
        ))),
    }
}
