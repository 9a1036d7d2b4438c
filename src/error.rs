//! Error types for mcpipe
//!
//! Provides a unified error type for all client operations.
//!
//! Only issuance failures are ever returned to callers. Reply-level
//! outcomes travel through completions, and a command that never completes
//! is the only signal that its reply was lost.

use thiserror::Error;

/// Result type alias using McError
pub type Result<T> = std::result::Result<T, McError>;

/// Unified error type for mcpipe operations
#[derive(Debug, Error)]
pub enum McError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// A reply line could not be interpreted (e.g. a bad VALUE length)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The byte stream lost alignment with the reply boundaries
    #[error("Framing error: {0}")]
    Framing(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    /// The connection worker has exited and accepts no more commands
    #[error("Connection closed")]
    Closed,
}
