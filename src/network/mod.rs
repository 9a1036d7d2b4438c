//! Network Module
//!
//! Connections to the memcache server.
//!
//! ## Architecture
//! - One worker thread per connection owns its socket and pipeline state
//! - One reader thread per live socket feeds inbound bytes to the worker
//! - Callers on any thread hand commands to workers over channels
//! - The pool spreads commands round-robin over its connections

mod connection;
mod pool;

pub use connection::{Connection, ConnectionState, RETRY_DELAY};
pub use pool::ConnectionPool;
