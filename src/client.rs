//! Client operations
//!
//! The command surface shared by a single [`Connection`] and a
//! [`ConnectionPool`]. Every method returns as soon as the command has been
//! handed to a connection worker; replies arrive later through the
//! completion, on the worker thread, in issuance order per connection.
//!
//! An `Err` here means the command was never issued (bad key, value that
//! cannot be serialized, worker gone). A command that was issued but never
//! completes, for example because the connection dropped while it was in
//! flight, gives no other signal; callers that care must apply their own
//! timeout.
//!
//! [`Connection`]: crate::network::Connection
//! [`ConnectionPool`]: crate::network::ConnectionPool

use crate::error::Result;
use crate::protocol::{
    prepare_store, validate_key, Command, CommandOptions, Status, StatusCallback,
};
use crate::value::{Value, ValueCodec};

/// Issue memcache commands
pub trait Client {
    /// Hand a prepared command to a connection
    fn submit(&self, command: Command) -> Result<()>;

    /// Codec used for non-raw values
    fn codec(&self) -> &dyn ValueCodec;

    /// Store `value` under `key`
    fn set<F>(
        &self,
        key: impl AsRef<[u8]>,
        value: impl Into<Value>,
        options: CommandOptions,
        on_done: F,
    ) -> Result<()>
    where
        F: FnOnce(Status) + Send + 'static,
    {
        self.store(key.as_ref(), value.into(), options, Some(Box::new(on_done)))
    }

    /// Store `value` under `key` without asking for a reply
    fn set_noreply(
        &self,
        key: impl AsRef<[u8]>,
        value: impl Into<Value>,
        options: CommandOptions,
    ) -> Result<()> {
        self.store(key.as_ref(), value.into(), options, None)
    }

    /// Fetch `key`; `on_value` receives `None` on a miss
    fn get<F>(&self, key: impl AsRef<[u8]>, options: CommandOptions, on_value: F) -> Result<()>
    where
        F: FnOnce(Option<Value>) + Send + 'static,
    {
        let key = key.as_ref();
        validate_key(key)?;
        self.submit(Command::get(key, options.raw, on_value))
    }

    /// Delete `key`; `on_done` receives `Deleted` or `NotFound`
    fn delete<F>(&self, key: impl AsRef<[u8]>, on_done: F) -> Result<()>
    where
        F: FnOnce(Status) + Send + 'static,
    {
        let key = key.as_ref();
        validate_key(key)?;
        self.submit(Command::delete(key, Some(Box::new(on_done))))
    }

    /// Delete `key` without asking for a reply
    fn delete_noreply(&self, key: impl AsRef<[u8]>) -> Result<()> {
        let key = key.as_ref();
        validate_key(key)?;
        self.submit(Command::delete(key, None))
    }

    /// Invalidate all items on the server
    fn flush_all<F>(&self, on_done: F) -> Result<()>
    where
        F: FnOnce(Status) + Send + 'static,
    {
        self.submit(Command::flush_all(Some(Box::new(on_done))))
    }

    /// Invalidate all items without asking for a reply
    fn flush_all_noreply(&self) -> Result<()> {
        self.submit(Command::flush_all(None))
    }

    #[doc(hidden)]
    fn store(
        &self,
        key: &[u8],
        value: Value,
        options: CommandOptions,
        completion: Option<StatusCallback>,
    ) -> Result<()> {
        validate_key(key)?;
        let data = prepare_store(value, &options, self.codec())?;
        self.submit(Command::Set {
            key: key.to_vec(),
            data,
            flags: options.flags,
            expire: options.expire,
            completion,
        })
    }
}
