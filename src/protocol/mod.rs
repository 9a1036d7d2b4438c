//! Protocol Module
//!
//! The memcache text protocol as seen from the client side.
//!
//! ## Commands
//! | Command sent | Replies accepted | Payload |
//! |---|---|---|
//! | `set <key> <flags> <expire> <bytes>[ noreply]` | `STORED`, `NOT_STORED`, `EXISTS`, `NOT_FOUND` | no |
//! | `get <key>` | `VALUE <key> <flags> <bytes>` or `END` | after `VALUE` |
//! | `delete <key>[ noreply]` | `DELETED`, `NOT_FOUND` | no |
//! | `flush_all[ noreply]` | `OK` | no |
//!
//! All lines end in CRLF. A `VALUE` line is followed by exactly `<bytes>`
//! bytes of data, CRLF, and an `END` line.

mod command;
mod response;
mod codec;
mod framer;

pub use command::{Command, CommandOptions, CommandType, StatusCallback, ValueCallback};
pub use response::{
    ReplyLine, ReplyToken, Status, DELETE_REPLIES, FLUSH_REPLIES, GET_REPLIES, STORE_REPLIES,
};
pub use codec::{encode_command, prepare_store, validate_key, EncodedCommand, MAX_KEY_LEN};
pub use framer::{Frame, Framer, MAX_LINE_LEN};
