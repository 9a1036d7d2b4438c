//! Command definitions
//!
//! Represents commands issued by callers, before they are rendered to the
//! wire. A command carries its own one-shot completion; a store, delete or
//! flush without one is sent as `noreply`.

use std::fmt;

use bytes::Bytes;

use super::response::Status;
use crate::value::Value;

/// Completion for store/delete/flush replies
pub type StatusCallback = Box<dyn FnOnce(Status) + Send + 'static>;

/// Completion for fetch replies; `None` is a miss
pub type ValueCallback = Box<dyn FnOnce(Option<Value>) + Send + 'static>;

/// Per-command options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Bypass the value codec: store and fetch bytes unchanged
    pub raw: bool,

    /// Opaque client flags stored alongside the value
    pub flags: u32,

    /// Expiration time in seconds (0 = never)
    pub expire: u32,
}

impl CommandOptions {
    /// Options with `raw` set
    pub fn raw() -> Self {
        Self {
            raw: true,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_expire(mut self, expire: u32) -> Self {
        self.expire = expire;
        self
    }
}

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
    Delete,
    FlushAll,
}

/// A command ready to be encoded
///
/// `Set` holds the already-serialized value bytes.
pub enum Command {
    /// Store a value
    Set {
        key: Vec<u8>,
        data: Bytes,
        flags: u32,
        expire: u32,
        completion: Option<StatusCallback>,
    },

    /// Fetch a value; a fetch always expects a reply
    Get {
        key: Vec<u8>,
        raw: bool,
        callback: ValueCallback,
    },

    /// Delete a key
    Delete {
        key: Vec<u8>,
        completion: Option<StatusCallback>,
    },

    /// Invalidate every item on the server
    FlushAll { completion: Option<StatusCallback> },
}

impl Command {
    /// Build a fetch command
    pub fn get<F>(key: impl Into<Vec<u8>>, raw: bool, callback: F) -> Self
    where
        F: FnOnce(Option<Value>) + Send + 'static,
    {
        Command::Get {
            key: key.into(),
            raw,
            callback: Box::new(callback),
        }
    }

    /// Build a delete command, `noreply` when `completion` is `None`
    pub fn delete(key: impl Into<Vec<u8>>, completion: Option<StatusCallback>) -> Self {
        Command::Delete {
            key: key.into(),
            completion,
        }
    }

    /// Build a flush command, `noreply` when `completion` is `None`
    pub fn flush_all(completion: Option<StatusCallback>) -> Self {
        Command::FlushAll { completion }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
            Command::FlushAll { .. } => CommandType::FlushAll,
        }
    }

    /// Whether the peer will be asked to reply
    pub fn expects_reply(&self) -> bool {
        match self {
            Command::Set { completion, .. }
            | Command::Delete { completion, .. }
            | Command::FlushAll { completion } => completion.is_some(),
            Command::Get { .. } => true,
        }
    }

    /// Key of the command, if it has one
    pub fn key(&self) -> Option<&[u8]> {
        match self {
            Command::Set { key, .. } | Command::Get { key, .. } | Command::Delete { key, .. } => {
                Some(key)
            }
            Command::FlushAll { .. } => None,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key().map(String::from_utf8_lossy);
        f.debug_struct("Command")
            .field("type", &self.command_type())
            .field("key", &key)
            .field("expects_reply", &self.expects_reply())
            .finish()
    }
}
