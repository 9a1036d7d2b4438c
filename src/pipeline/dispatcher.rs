//! Response dispatcher
//!
//! Feeds inbound bytes through the [`Framer`] and matches each reply unit to
//! the head of the [`PipelineQueue`].
//!
//! ## Dispatch rules
//! - A bulk frame is active: the next unit is its payload. The completion
//!   gets the raw bytes, `None` for an empty non-raw payload, or the decoded
//!   value.
//! - Otherwise the head expectation is popped and the line's token checked
//!   against it:
//!   - not accepted: the line and the expectation are both dropped and the
//!     completion never fires
//!   - `VALUE`: a bulk frame starts with the third parameter as its length
//!   - `END`: the fetch missed
//!   - a status word: the status completion fires

use std::sync::Arc;

use bytes::Bytes;

use super::queue::{Completion, Expectation, PipelineQueue};
use crate::error::{McError, Result};
use crate::protocol::{Frame, Framer, ReplyLine, ReplyToken};
use crate::value::{Value, ValueCodec};

/// Reply state machine for one connection
pub struct Dispatcher {
    framer: Framer,
    queue: PipelineQueue,
    codec: Arc<dyn ValueCodec>,
}

impl Dispatcher {
    pub fn new(codec: Arc<dyn ValueCodec>) -> Self {
        Self {
            framer: Framer::new(),
            queue: PipelineQueue::new(),
            codec,
        }
    }

    /// Register the expectation of a command just sent
    pub fn expect(&mut self, expectation: Expectation) {
        self.queue.enqueue(expectation);
    }

    /// Commands sent and not yet answered, including a partial fetch
    pub fn in_flight(&self) -> usize {
        self.queue.len() + usize::from(self.queue.is_filling())
    }

    /// Process inbound bytes, returning how many completions fired
    ///
    /// An error means the stream can no longer be trusted; the caller should
    /// drop the connection.
    pub fn receive(&mut self, data: &[u8]) -> Result<usize> {
        self.framer.extend(data);

        let mut completed = 0;
        while let Some(frame) = self.framer.next_frame()? {
            completed += match frame {
                Frame::Line(line) => self.dispatch_line(line)?,
                Frame::Bulk(payload) => self.complete_bulk(payload)?,
            };
        }
        Ok(completed)
    }

    /// Forget all in-flight state after a disconnect
    ///
    /// Returns how many commands were dropped without completing.
    pub fn reset(&mut self) -> usize {
        self.framer.reset();
        self.queue.clear()
    }

    fn dispatch_line(&mut self, line: Bytes) -> Result<usize> {
        let reply = ReplyLine::parse(&line);

        let expectation = match self.queue.pop() {
            Some(expectation) => expectation,
            None => {
                tracing::debug!(
                    "Ignoring reply with nothing in flight: {:?}",
                    String::from_utf8_lossy(&line)
                );
                return Ok(0);
            }
        };

        let token = match reply.token {
            Some(token) if expectation.accepts(token) => token,
            _ => {
                tracing::warn!(
                    "Dropping reply {:?} and its command: expected one of {:?}",
                    String::from_utf8_lossy(&line),
                    expectation.accepted
                );
                return Ok(0);
            }
        };

        match (token, expectation.completion) {
            (ReplyToken::Value, completion) if expectation.is_bulk => {
                let declared_len = reply.value_length()?;
                let len = usize::try_from(declared_len).map_err(|_| {
                    McError::Protocol(format!("VALUE length {} too large", declared_len))
                })?;
                self.queue.begin_bulk(
                    Expectation::new(expectation.accepted, true, completion),
                    declared_len,
                );
                self.framer.expect_bulk(len);
                Ok(0)
            }
            (ReplyToken::End, Completion::Value { callback, .. }) => {
                callback(None);
                Ok(1)
            }
            (ReplyToken::Status(status), Completion::Status(callback)) => {
                callback(status);
                Ok(1)
            }
            (token, completion) => {
                tracing::warn!(
                    "Reply {} does not fit pending {:?}, dropping it",
                    token,
                    completion
                );
                Ok(0)
            }
        }
    }

    fn complete_bulk(&mut self, payload: Bytes) -> Result<usize> {
        let frame = self.queue.take_bulk().ok_or_else(|| {
            McError::Framing("value payload without a pending fetch".to_string())
        })?;
        debug_assert_eq!(frame.declared_len, payload.len() as u64);

        let (raw, callback) = match frame.expectation.completion {
            Completion::Value { raw, callback } => (raw, callback),
            Completion::Status(_) => {
                tracing::warn!("Value payload matched a status completion, dropping it");
                return Ok(0);
            }
        };

        if raw {
            callback(Some(Value::Bytes(payload.to_vec())));
        } else if payload.is_empty() {
            callback(None);
        } else {
            match self.codec.decode(&payload) {
                Ok(value) => callback(Some(value)),
                Err(e) => {
                    tracing::warn!("Dropping fetched value of {} bytes: {}", payload.len(), e);
                    return Ok(0);
                }
            }
        }
        Ok(1)
    }
}
