//! Typed publish/subscribe events with rooms, over any connection transport.
//!
//! roomcast checks everything that crosses a connection against a declared
//! vocabulary: which events exist, which side may originate them and what
//! positional arguments they carry. The same structure language that checks
//! event definitions is available for any JSON document.
//!
//! # Crate Structure
//!
//! - [`schema`]: structure documents and the recursive JSON validator
//! - [`events`]: the event taxonomy built from a definitions document
//! - [`transport`]: the connection boundary and an in-memory transport
//! - [`hub`]: connections, rooms, the room directory and the connection
//!   registry (behind the `hub` feature)

/// Re-export schema types.
pub mod schema {
    pub use roomcast_schema::*;
}

/// Re-export event taxonomy types.
pub mod events {
    pub use roomcast_events::*;
}

/// Re-export transport types.
pub mod transport {
    pub use roomcast_transport::*;
}

/// Re-export hub types (requires `hub` feature).
#[cfg(feature = "hub")]
pub mod hub {
    pub use roomcast_hub::*;
}
