//! Configuration for mcpipe
//!
//! Centralized configuration with sensible defaults. The recognized options
//! are the endpoint (host, port) and the number of pooled connections.

use crate::error::{McError, Result};

/// Main configuration for a client pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Host name or IP address of the memcache server
    pub host: String,

    /// TCP port of the memcache server
    pub port: u16,

    // -------------------------------------------------------------------------
    // Pool Configuration
    // -------------------------------------------------------------------------
    /// Number of independent connections in the pool
    pub connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11211,
            connections: 4,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Endpoint as `host:port`, suitable for `TcpStream::connect`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the config before building a pool from it
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(McError::Config("host must not be empty".to_string()));
        }
        if self.connections == 0 {
            return Err(McError::Config(
                "pool needs at least one connection".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the pool size
    pub fn connections(mut self, count: usize) -> Self {
        self.config.connections = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
