//! Connection transport boundary.
//!
//! roomcast does not own the wire. Any bidirectional, per-connection
//! transport that can send a named message with positional JSON arguments,
//! dispatch inbound messages by name and report its own closure can sit
//! under the event layer by implementing [`Transport`].
//!
//! [`MemoryTransport`] is an in-process implementation that records every
//! outbound write and lets callers inject inbound traffic.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::{MemoryTransport, SentMessage};
pub use traits::{CloseHook, Handler, OnceHandler, Transport};
