//! Pipeline queue
//!
//! FIFO of expectations for commands sent but not yet answered. Replies are
//! matched to commands purely by position, so the queue order must mirror
//! send order on the connection.

use std::collections::VecDeque;
use std::fmt;

use crate::protocol::{ReplyToken, StatusCallback, ValueCallback};

/// One-shot completion bound to an in-flight command
pub enum Completion {
    /// Store, delete and flush replies
    Status(StatusCallback),

    /// Fetch replies; `raw` skips the value codec
    Value { raw: bool, callback: ValueCallback },
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Status(_) => f.write_str("Completion::Status"),
            Completion::Value { raw, .. } => write!(f, "Completion::Value {{ raw: {} }}", raw),
        }
    }
}

/// Reply shapes an in-flight command accepts, and what to do on a match
#[derive(Debug)]
pub struct Expectation {
    pub accepted: &'static [ReplyToken],

    /// A matched `VALUE` reply is followed by a payload
    pub is_bulk: bool,

    pub completion: Completion,
}

impl Expectation {
    pub fn new(accepted: &'static [ReplyToken], is_bulk: bool, completion: Completion) -> Self {
        Self {
            accepted,
            is_bulk,
            completion,
        }
    }

    pub fn accepts(&self, token: ReplyToken) -> bool {
        self.accepted.contains(&token)
    }
}

/// A fetch whose payload is being read
#[derive(Debug)]
pub struct BulkFrame {
    pub declared_len: u64,
    pub expectation: Expectation,
}

/// In-flight expectations for one connection
///
/// Owned by the connection worker; there is no internal locking.
#[derive(Debug, Default)]
pub struct PipelineQueue {
    in_flight: VecDeque<Expectation>,
    filling: Option<BulkFrame>,
}

impl PipelineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, expectation: Expectation) {
        self.in_flight.push_back(expectation);
    }

    pub fn peek(&self) -> Option<&Expectation> {
        self.in_flight.front()
    }

    pub fn pop(&mut self) -> Option<Expectation> {
        self.in_flight.pop_front()
    }

    /// Queued expectations, not counting an active bulk frame
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty() && self.filling.is_none()
    }

    /// Mark `expectation` as receiving a payload of `declared_len` bytes
    pub fn begin_bulk(&mut self, expectation: Expectation, declared_len: u64) {
        debug_assert!(self.filling.is_none(), "only one bulk frame at a time");
        self.filling = Some(BulkFrame {
            declared_len,
            expectation,
        });
    }

    pub fn is_filling(&self) -> bool {
        self.filling.is_some()
    }

    pub fn take_bulk(&mut self) -> Option<BulkFrame> {
        self.filling.take()
    }

    /// Drop everything in flight without completing it
    ///
    /// Returns how many commands were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.in_flight.len() + usize::from(self.filling.is_some());
        self.in_flight.clear();
        self.filling = None;
        dropped
    }
}
