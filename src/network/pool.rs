//! Connection pool
//!
//! A fixed set of connections to one endpoint. Commands are spread across
//! them round-robin; this is for parallelism only, since every connection
//! reaches the same server and sees the same data. Ordering holds per
//! connection, not across the pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::connection::Connection;
use crate::client::Client;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Command, Status};
use crate::value::{BincodeCodec, ValueCodec};

/// Round-robin pool of connections
pub struct ConnectionPool {
    connections: Vec<Connection>,
    cursor: AtomicUsize,
    codec: Arc<dyn ValueCodec>,
}

impl ConnectionPool {
    /// Open a pool using the default value codec
    pub fn connect(config: &Config) -> Result<Self> {
        Self::with_codec(config, Arc::new(BincodeCodec))
    }

    /// Open a pool with a custom value codec
    pub fn with_codec(config: &Config, codec: Arc<dyn ValueCodec>) -> Result<Self> {
        config.validate()?;
        let addr = config.addr();

        let connections = (0..config.connections)
            .map(|id| Connection::open(id, addr.clone(), Arc::clone(&codec)))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Opened pool of {} connections to {}",
            connections.len(),
            addr
        );

        Ok(Self {
            connections,
            cursor: AtomicUsize::new(0),
            codec,
        })
    }

    /// Next connection in round-robin order
    pub fn next_connection(&self) -> &Connection {
        let n = self.cursor.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        &self.connections[n]
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Client for ConnectionPool {
    fn submit(&self, command: Command) -> Result<()> {
        self.next_connection().submit(command)
    }

    fn codec(&self) -> &dyn ValueCodec {
        self.codec.as_ref()
    }

    /// Flush through every connection
    ///
    /// `on_done` fires once, after all connections have answered.
    fn flush_all<F>(&self, on_done: F) -> Result<()>
    where
        F: FnOnce(Status) + Send + 'static,
    {
        let remaining = Arc::new(AtomicUsize::new(self.connections.len()));
        let on_done = Arc::new(Mutex::new(Some(on_done)));

        for conn in &self.connections {
            let remaining = Arc::clone(&remaining);
            let on_done = Arc::clone(&on_done);
            conn.flush_all(move |_| {
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    if let Some(on_done) = on_done.lock().take() {
                        on_done(Status::Ok);
                    }
                }
            })?;
        }
        Ok(())
    }

    fn flush_all_noreply(&self) -> Result<()> {
        for conn in &self.connections {
            conn.flush_all_noreply()?;
        }
        Ok(())
    }
}
