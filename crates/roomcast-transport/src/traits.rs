use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Persistent inbound message handler.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Inbound message handler that runs at most once.
pub type OnceHandler = Box<dyn FnOnce(&[Value]) + Send>;

/// Callback run when the connection closes, from either side.
pub type CloseHook = Box<dyn FnOnce() + Send>;

/// One live, bidirectional connection.
///
/// Implementations must be shareable across threads; every method takes
/// `&self`.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Stable identity of this connection.
    fn id(&self) -> &str;

    /// Write one named message with positional arguments.
    fn send(&self, name: &str, args: &[Value]) -> Result<()>;

    /// Register a handler for every inbound message called `name`.
    fn on(&self, name: &str, handler: Handler);

    /// Register a handler for the next inbound message called `name`.
    fn once(&self, name: &str, handler: OnceHandler);

    /// Register a hook run once when the connection closes.
    ///
    /// Runs immediately if the connection is already closed.
    fn on_close(&self, hook: CloseHook);

    /// Close the connection. Closing twice is a no-op.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
