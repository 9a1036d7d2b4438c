//! Cached values and the pluggable serialization hook
//!
//! Stores and fetches that are not `raw` run their value through a
//! [`ValueCodec`]. The default codec is [`BincodeCodec`], a compact binary
//! format over the serde-derived [`Value`] type. It is not compatible with
//! any other client's native serialization; callers sharing a cache with
//! such clients must inject a matching codec.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{McError, Result};

/// A dynamically typed cache value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Borrow the raw bytes of a string or byte value
    ///
    /// Raw stores accept only these two variants.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Take the raw bytes of a string or byte value
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::Str(s) => Some(s.into_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Encode/decode hook applied to non-raw values
pub trait ValueCodec: Send + Sync {
    /// Serialize a value into the bytes stored on the server
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Deserialize bytes fetched from the server
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// Default codec: bincode over [`Value`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl ValueCodec for BincodeCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(|e| McError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        bincode::deserialize(bytes).map_err(|e| McError::Serialization(e.to_string()))
    }
}
