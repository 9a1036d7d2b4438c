//! # mcpipe
//!
//! A memcache text protocol client with:
//! - Pipelining: many commands in flight per connection, replies matched by position
//! - Binary-safe values: payloads are counted, never scanned for terminators
//! - Non-blocking calls: results are delivered to one-shot completions
//! - Automatic reconnection, with commands queued while disconnected
//! - A round-robin pool of connections to one server
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Callers (any thread)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Client::set / get / delete / flush_all
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              ConnectionPool (round-robin)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command (channel)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │          Connection worker (one per connection)              │
//! │   pending queue ─► encoder ─► socket                         │
//! │   socket ─► framer ─► dispatcher ─► pipeline queue head      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ completion(status | value)
//!                       ▼
//!                    caller
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mcpipe::{Client, CommandOptions, Config, ConnectionPool};
//!
//! let pool = ConnectionPool::connect(&Config::default())?;
//! pool.set("greeting", "hello", CommandOptions::default(), |status| {
//!     println!("set: {}", status);
//! })?;
//! pool.get("greeting", CommandOptions::default(), |value| {
//!     println!("get: {:?}", value);
//! })?;
//! # Ok::<(), mcpipe::McError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod value;

pub mod protocol;
pub mod pipeline;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{McError, Result};
pub use config::Config;
pub use value::{BincodeCodec, Value, ValueCodec};
pub use protocol::{CommandOptions, Status};
pub use network::{Connection, ConnectionPool, ConnectionState};
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mcpipe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
