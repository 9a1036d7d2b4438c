//! Command encoder
//!
//! Renders commands into their wire form and builds the expectation that
//! matches each command's reply.
//!
//! ## Wire Format
//! ```text
//! set <key> <flags> <expire> <bytes>[ noreply]\r\n<data>\r\n
//! get <key>\r\n
//! delete <key>[ noreply]\r\n
//! flush_all[ noreply]\r\n
//! ```
//!
//! `noreply` is written exactly when the command carries no completion, and
//! an [`Expectation`] is produced exactly when it does. Splitting those two
//! decisions apart would desynchronize the pipeline.

use bytes::{BufMut, Bytes, BytesMut};

use super::command::{Command, CommandOptions};
use super::response::{DELETE_REPLIES, FLUSH_REPLIES, GET_REPLIES, STORE_REPLIES};
use crate::error::{McError, Result};
use crate::pipeline::{Completion, Expectation};
use crate::value::{Value, ValueCodec};

/// Maximum key length accepted by memcached
pub const MAX_KEY_LEN: usize = 250;

const CRLF: &[u8] = b"\r\n";
const NOREPLY: &[u8] = b" noreply";

/// Wire bytes plus the reply expectation, if any
#[derive(Debug)]
pub struct EncodedCommand {
    pub wire: Bytes,
    pub expectation: Option<Expectation>,
}

/// Check that a key can be written into a command line
pub fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(McError::InvalidKey("key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(McError::InvalidKey(format!(
            "key is {} bytes (max {})",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    if let Some(b) = key
        .iter()
        .find(|b| b.is_ascii_whitespace() || b.is_ascii_control())
    {
        return Err(McError::InvalidKey(format!(
            "key contains byte 0x{:02x}",
            b
        )));
    }
    Ok(())
}

/// Serialize a value for storage
///
/// Raw values must already be bytes or a string and are stored unchanged.
/// The length written on the wire is the length of the returned bytes.
pub fn prepare_store(
    value: Value,
    options: &CommandOptions,
    codec: &dyn ValueCodec,
) -> Result<Bytes> {
    if options.raw {
        return value.into_bytes().map(Bytes::from).ok_or_else(|| {
            McError::Serialization("raw store needs a string or byte value".to_string())
        });
    }
    codec.encode(&value).map(Bytes::from)
}

/// Encode a command to wire bytes
pub fn encode_command(command: Command) -> EncodedCommand {
    let mut wire = BytesMut::new();

    let expectation = match command {
        Command::Set {
            key,
            data,
            flags,
            expire,
            completion,
        } => {
            let header = format!(" {} {} {}", flags, expire, data.len());
            wire.reserve(4 + key.len() + header.len() + NOREPLY.len() + data.len() + 4);
            wire.put_slice(b"set ");
            wire.put_slice(&key);
            wire.put_slice(header.as_bytes());
            if completion.is_none() {
                wire.put_slice(NOREPLY);
            }
            wire.put_slice(CRLF);
            wire.put_slice(&data);
            wire.put_slice(CRLF);
            completion
                .map(|cb| Expectation::new(STORE_REPLIES, false, Completion::Status(cb)))
        }
        Command::Get { key, raw, callback } => {
            wire.reserve(4 + key.len() + 2);
            wire.put_slice(b"get ");
            wire.put_slice(&key);
            wire.put_slice(CRLF);
            Some(Expectation::new(
                GET_REPLIES,
                true,
                Completion::Value { raw, callback },
            ))
        }
        Command::Delete { key, completion } => {
            wire.reserve(7 + key.len() + NOREPLY.len() + 2);
            wire.put_slice(b"delete ");
            wire.put_slice(&key);
            if completion.is_none() {
                wire.put_slice(NOREPLY);
            }
            wire.put_slice(CRLF);
            completion
                .map(|cb| Expectation::new(DELETE_REPLIES, false, Completion::Status(cb)))
        }
        Command::FlushAll { completion } => {
            wire.put_slice(b"flush_all");
            if completion.is_none() {
                wire.put_slice(NOREPLY);
            }
            wire.put_slice(CRLF);
            completion.map(|cb| Expectation::new(FLUSH_REPLIES, false, Completion::Status(cb)))
        }
    };

    EncodedCommand {
        wire: wire.freeze(),
        expectation,
    }
}
