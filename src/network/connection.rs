//! Connection lifecycle
//!
//! Each [`Connection`] is a cheap handle onto a worker thread that owns one
//! TCP socket to the server, the queue of commands issued while
//! disconnected, and the reply [`Dispatcher`].
//!
//! ## Threads
//! - **Worker**: the only owner of the pipeline state. Selects between
//!   commands from handles and events from the reader, writes commands,
//!   and runs completions.
//! - **Reader** (one per socket): blocks on `read` and forwards byte chunks
//!   to the worker, tagged with the socket generation so that events from a
//!   socket that has since been dropped are ignored.
//!
//! ## States
//! ```text
//! Disconnected ──► Connecting ──► Connected
//!      ▲               │              │
//!      └───────────────┴──────────────┘  (refused, reset, peer close, desync)
//! ```
//! Reconnection starts immediately after a drop and repeats every
//! [`RETRY_DELAY`] while the server is unreachable, without limit.

use std::collections::VecDeque;
use std::io::{self, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;

use crate::client::Client;
use crate::error::{McError, Result};
use crate::pipeline::Dispatcher;
use crate::protocol::{encode_command, Command, EncodedCommand};
use crate::value::ValueCodec;

/// Pause between failed connection attempts
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Read chunk size for the socket reader
const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Commands written before the socket is flushed
const MAX_BATCH: usize = 256;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Handle to a lifecycle-managed connection
///
/// Clones share the same worker. The worker exits once every clone has been
/// dropped; commands still in flight at that point never complete.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Handle>,
}

struct Handle {
    id: usize,
    addr: String,
    commands: Sender<Command>,
    state: Arc<RwLock<ConnectionState>>,
    codec: Arc<dyn ValueCodec>,
}

impl Connection {
    /// Spawn a worker for `addr` and start connecting
    ///
    /// Returns as soon as the worker is running; commands issued before the
    /// socket is up are queued and sent once it is.
    pub fn open(id: usize, addr: impl Into<String>, codec: Arc<dyn ValueCodec>) -> Result<Self> {
        let addr = addr.into();
        let (tx, rx) = channel::unbounded();
        let state = Arc::new(RwLock::new(ConnectionState::Disconnected));

        let worker = Worker::new(id, addr.clone(), rx, Arc::clone(&state), Arc::clone(&codec));
        thread::Builder::new()
            .name(format!("mcpipe-conn-{}", id))
            .spawn(move || worker.run())?;

        Ok(Self {
            inner: Arc::new(Handle {
                id,
                addr,
                commands: tx,
                state,
                codec,
            }),
        })
    }

    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Server address this connection targets
    pub fn addr(&self) -> &str {
        &self.inner.addr
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

impl Client for Connection {
    fn submit(&self, command: Command) -> Result<()> {
        self.inner.commands.send(command).map_err(|_| McError::Closed)
    }

    fn codec(&self) -> &dyn ValueCodec {
        self.inner.codec.as_ref()
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Events from a socket reader
enum Inbound {
    Data { generation: u64, bytes: Vec<u8> },
    Closed { generation: u64, error: Option<io::Error> },
}

/// The live socket
struct Link {
    writer: BufWriter<TcpStream>,
    generation: u64,
}

struct Worker {
    id: usize,
    addr: String,
    commands: Receiver<Command>,
    state: Arc<RwLock<ConnectionState>>,

    /// Commands issued while not connected, in issuance order
    pending: VecDeque<Command>,
    dispatcher: Dispatcher,

    link: Option<Link>,
    generation: u64,
    events_tx: Sender<Inbound>,
    events_rx: Receiver<Inbound>,
}

impl Worker {
    fn new(
        id: usize,
        addr: String,
        commands: Receiver<Command>,
        state: Arc<RwLock<ConnectionState>>,
        codec: Arc<dyn ValueCodec>,
    ) -> Self {
        let (events_tx, events_rx) = channel::unbounded();
        Self {
            id,
            addr,
            commands,
            state,
            pending: VecDeque::new(),
            dispatcher: Dispatcher::new(codec),
            link: None,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    fn run(mut self) {
        tracing::debug!("Connection {} worker started for {}", self.id, self.addr);

        let commands = self.commands.clone();
        let events = self.events_rx.clone();

        loop {
            if self.link.is_none() && !self.connect() {
                break;
            }

            crossbeam::select! {
                recv(commands) -> msg => match msg {
                    Ok(command) => self.issue_batch(command),
                    Err(_) => break,
                },
                recv(events) -> msg => {
                    if let Ok(event) = msg {
                        self.on_event(event);
                    }
                }
            }
        }

        self.disconnect("all handles dropped");
        tracing::debug!("Connection {} worker stopped", self.id);
    }

    /// Connect, retrying until success or until every handle is gone
    ///
    /// Commands arriving meanwhile join the pending queue. Returns false when
    /// the worker should exit.
    fn connect(&mut self) -> bool {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            self.set_state(ConnectionState::Connecting);

            match TcpStream::connect(&self.addr).and_then(|stream| self.establish(stream)) {
                Ok(()) => {
                    tracing::info!(
                        "Connection {} connected to {} (attempt {})",
                        self.id,
                        self.addr,
                        attempt
                    );
                    self.replay_pending();
                    return true;
                }
                Err(e) if attempt == 1 => {
                    tracing::warn!("Connection {} cannot reach {}: {}", self.id, self.addr, e);
                }
                Err(e) => {
                    tracing::trace!(
                        "Connection {} attempt {} to {} failed: {}",
                        self.id,
                        attempt,
                        self.addr,
                        e
                    );
                }
            }

            self.set_state(ConnectionState::Disconnected);

            let deadline = Instant::now() + RETRY_DELAY;
            loop {
                match self.commands.recv_deadline(deadline) {
                    Ok(command) => self.pending.push_back(command),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return false,
                }
            }
        }
    }

    fn establish(&mut self, stream: TcpStream) -> io::Result<()> {
        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;

        let generation = self.generation + 1;
        let events = self.events_tx.clone();
        let id = self.id;
        thread::Builder::new()
            .name(format!("mcpipe-read-{}", id))
            .spawn(move || read_loop(id, generation, reader, events))?;

        self.generation = generation;
        self.link = Some(Link {
            writer: BufWriter::new(stream),
            generation,
        });
        self.set_state(ConnectionState::Connected);
        Ok(())
    }

    /// Send commands queued while disconnected, oldest first, exactly once
    fn replay_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        tracing::debug!(
            "Connection {} replaying {} queued commands",
            self.id,
            self.pending.len()
        );

        while let Some(command) = self.pending.pop_front() {
            if self.link.is_none() {
                self.pending.push_front(command);
                break;
            }
            self.send(command);
        }
        self.flush();
    }

    /// Issue `first` and whatever else is already waiting, then flush once
    fn issue_batch(&mut self, first: Command) {
        self.send(first);
        for _ in 1..MAX_BATCH {
            match self.commands.try_recv() {
                Ok(command) => self.send(command),
                Err(_) => break,
            }
        }
        self.flush();
    }

    fn send(&mut self, command: Command) {
        let link = match self.link.as_mut() {
            Some(link) => link,
            None => {
                self.pending.push_back(command);
                return;
            }
        };

        tracing::trace!("Connection {} sending {:?}", self.id, command);
        let EncodedCommand { wire, expectation } = encode_command(command);
        let written = link.writer.write_all(&wire);

        if let Some(expectation) = expectation {
            self.dispatcher.expect(expectation);
        }
        if let Err(e) = written {
            self.disconnect(&format!("write failed: {}", e));
        }
    }

    fn flush(&mut self) {
        let flushed = match self.link.as_mut() {
            Some(link) => link.writer.flush(),
            None => return,
        };
        if let Err(e) = flushed {
            self.disconnect(&format!("flush failed: {}", e));
        }
    }

    fn on_event(&mut self, event: Inbound) {
        let current = self.link.as_ref().map(|link| link.generation);

        match event {
            Inbound::Data { generation, bytes } if Some(generation) == current => {
                match self.dispatcher.receive(&bytes) {
                    Ok(completed) => tracing::trace!(
                        "Connection {} read {} bytes, {} completions",
                        self.id,
                        bytes.len(),
                        completed
                    ),
                    Err(e) => self.disconnect(&format!("reply stream out of sync: {}", e)),
                }
            }
            Inbound::Closed { generation, error } if Some(generation) == current => {
                let reason = match error {
                    Some(e) => format!("read failed: {}", e),
                    None => "closed by peer".to_string(),
                };
                self.disconnect(&reason);
            }
            _ => tracing::trace!("Connection {} ignoring event from a dropped socket", self.id),
        }
    }

    /// Drop the socket and everything in flight on it
    fn disconnect(&mut self, reason: &str) {
        if let Some(link) = self.link.take() {
            let _ = link.writer.get_ref().shutdown(Shutdown::Both);
            let dropped = self.dispatcher.reset();
            if dropped > 0 {
                tracing::warn!(
                    "Connection {} to {} lost ({}), {} in-flight commands dropped",
                    self.id,
                    self.addr,
                    reason,
                    dropped
                );
            } else {
                tracing::info!("Connection {} to {} lost ({})", self.id, self.addr, reason);
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }
}

/// Forward socket reads to the worker until the socket or the worker goes away
fn read_loop(id: usize, generation: u64, mut stream: TcpStream, events: Sender<Inbound>) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match stream.read(&mut buf) {
            Ok(0) => {
                let _ = events.send(Inbound::Closed {
                    generation,
                    error: None,
                });
                break;
            }
            Ok(n) => {
                let event = Inbound::Data {
                    generation,
                    bytes: buf[..n].to_vec(),
                };
                if events.send(event).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = events.send(Inbound::Closed {
                    generation,
                    error: Some(e),
                });
                break;
            }
        }
    }

    tracing::trace!("Connection {} reader {} exiting", id, generation);
}
