//! mcpipe CLI Client
//!
//! Command-line interface for issuing single commands to a memcache server.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossbeam::channel::{self, Receiver};
use mcpipe::{BincodeCodec, Client, CommandOptions, Config, Connection, McError, Status, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// mcpipe CLI
#[derive(Parser, Debug)]
#[command(name = "mcpipe-cli")]
#[command(about = "CLI for memcache servers")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "11211")]
    port: u16,

    /// Store and print values as raw bytes instead of encoded values
    #[arg(short, long)]
    raw: bool,

    /// How long to wait for the reply (milliseconds)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Opaque flags stored with the value
        #[arg(long, default_value = "0")]
        flags: u32,

        /// Expiration in seconds (0 = never)
        #[arg(long, default_value = "0")]
        expire: u32,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Invalidate all items
    Flush,
}

enum Reply {
    Status(Status),
    Value(Option<Value>),
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Run one command, returning whether it succeeded
fn run(args: &Args) -> Result<bool, McError> {
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .connections(1)
        .build();
    config.validate()?;

    let conn = Connection::open(0, config.addr(), Arc::new(BincodeCodec))?;
    let options = CommandOptions {
        raw: args.raw,
        ..CommandOptions::default()
    };

    let reply = match &args.command {
        Commands::Get { key } => {
            let (tx, rx) = channel::bounded(1);
            conn.get(key, options, move |value| {
                let _ = tx.send(Reply::Value(value));
            })?;
            wait(&rx, args.timeout_ms)?
        }
        Commands::Set {
            key,
            value,
            flags,
            expire,
        } => {
            let (tx, rx) = channel::bounded(1);
            let options = options.with_flags(*flags).with_expire(*expire);
            conn.set(key, value.as_str(), options, move |status| {
                let _ = tx.send(Reply::Status(status));
            })?;
            wait(&rx, args.timeout_ms)?
        }
        Commands::Del { key } => {
            let (tx, rx) = channel::bounded(1);
            conn.delete(key, move |status| {
                let _ = tx.send(Reply::Status(status));
            })?;
            wait(&rx, args.timeout_ms)?
        }
        Commands::Flush => {
            let (tx, rx) = channel::bounded(1);
            conn.flush_all(move |status| {
                let _ = tx.send(Reply::Status(status));
            })?;
            wait(&rx, args.timeout_ms)?
        }
    };

    Ok(print_reply(reply))
}

fn wait(rx: &Receiver<Reply>, timeout_ms: u64) -> Result<Reply, McError> {
    rx.recv_timeout(Duration::from_millis(timeout_ms)).map_err(|_| {
        McError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("no reply within {} ms", timeout_ms),
        ))
    })
}

fn print_reply(reply: Reply) -> bool {
    match reply {
        Reply::Status(status) => {
            println!("{}", status.as_str().to_uppercase());
            status.is_success()
        }
        Reply::Value(None) => {
            println!("(nil)");
            false
        }
        Reply::Value(Some(Value::Bytes(bytes))) => {
            println!("{}", String::from_utf8_lossy(&bytes));
            true
        }
        Reply::Value(Some(Value::Str(s))) => {
            println!("{}", s);
            true
        }
        Reply::Value(Some(value)) => {
            println!("{:?}", value);
            true
        }
    }
}
