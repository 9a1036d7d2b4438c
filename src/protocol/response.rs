//! Reply definitions
//!
//! Status words a server sends back, and the split of a reply line into its
//! leading token and trailing parameters.

use std::fmt;

use crate::error::{McError, Result};

/// Outcome passed to store, delete and flush completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Stored,
    NotStored,
    Exists,
    NotFound,
    Deleted,
    Ok,
}

impl Status {
    /// True for the reply that means the command took effect
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Stored | Status::Deleted | Status::Ok)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Stored => "stored",
            Status::NotStored => "not_stored",
            Status::Exists => "exists",
            Status::NotFound => "not_found",
            Status::Deleted => "deleted",
            Status::Ok => "ok",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading word of a reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyToken {
    Status(Status),
    /// `VALUE <key> <flags> <bytes>`, followed by a payload
    Value,
    /// `END`, a fetch that found nothing
    End,
}

impl ReplyToken {
    /// Parse a reply word, ignoring ASCII case
    pub fn parse(word: &[u8]) -> Option<Self> {
        const TOKENS: [(&str, ReplyToken); 8] = [
            ("stored", ReplyToken::Status(Status::Stored)),
            ("not_stored", ReplyToken::Status(Status::NotStored)),
            ("exists", ReplyToken::Status(Status::Exists)),
            ("not_found", ReplyToken::Status(Status::NotFound)),
            ("deleted", ReplyToken::Status(Status::Deleted)),
            ("ok", ReplyToken::Status(Status::Ok)),
            ("value", ReplyToken::Value),
            ("end", ReplyToken::End),
        ];

        TOKENS
            .iter()
            .find(|(name, _)| word.eq_ignore_ascii_case(name.as_bytes()))
            .map(|(_, token)| *token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyToken::Status(status) => status.as_str(),
            ReplyToken::Value => "value",
            ReplyToken::End => "end",
        }
    }
}

impl fmt::Display for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Accepted reply sets
// =============================================================================

pub const STORE_REPLIES: &[ReplyToken] = &[
    ReplyToken::Status(Status::Stored),
    ReplyToken::Status(Status::NotStored),
    ReplyToken::Status(Status::Exists),
    ReplyToken::Status(Status::NotFound),
];

pub const GET_REPLIES: &[ReplyToken] = &[ReplyToken::Value, ReplyToken::End];

pub const DELETE_REPLIES: &[ReplyToken] = &[
    ReplyToken::Status(Status::Deleted),
    ReplyToken::Status(Status::NotFound),
];

pub const FLUSH_REPLIES: &[ReplyToken] = &[ReplyToken::Status(Status::Ok)];

// =============================================================================
// Reply line splitting
// =============================================================================

/// A reply line split on spaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine<'a> {
    /// First word, as received
    pub word: &'a [u8],

    /// Recognized token, if the word is one
    pub token: Option<ReplyToken>,

    /// Remaining words
    pub params: Vec<&'a [u8]>,
}

impl<'a> ReplyLine<'a> {
    pub fn parse(line: &'a [u8]) -> Self {
        let mut words = line.split(|b| *b == b' ').filter(|w| !w.is_empty());
        let word = words.next().unwrap_or(&[]);
        Self {
            word,
            token: ReplyToken::parse(word),
            params: words.collect(),
        }
    }

    /// Declared payload length of a `VALUE <key> <flags> <bytes>` line
    pub fn value_length(&self) -> Result<u64> {
        let raw = self.params.get(2).ok_or_else(|| {
            McError::Protocol(format!(
                "VALUE line has {} parameters, expected 3",
                self.params.len()
            ))
        })?;

        std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| {
                McError::Protocol(format!(
                    "invalid VALUE length: {:?}",
                    String::from_utf8_lossy(raw)
                ))
            })
    }
}
