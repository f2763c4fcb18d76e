//! Typed connections, rooms and broadcast fan-out.
//!
//! This is the layer applications talk to. A [`ConnectionRegistry`] wraps
//! every raw transport in a [`Connection`] that refuses to send anything the
//! event taxonomy does not allow. [`Room`]s group connections behind an
//! allow-list or deny-list and broadcast to them.
//!
//! Two ways to put an event on the wire:
//! - `send` / `emit` / `broadcast_all` originate it, and require the event
//!   to be `server_to_client`;
//! - `relay` / `transmit` / `relay_all` forward something a client sent and
//!   skip that origin check.
//!
//! Both always check the payload before anything is written.

mod broadcast;
pub mod config;
pub mod connection;
pub mod directory;
pub mod error;
pub mod registry;
pub mod room;

#[cfg(test)]
mod testing;

pub use config::{settings_contract, HubSettings, RoomSpec};
pub use connection::Connection;
pub use directory::RoomDirectory;
pub use error::{HubError, Result};
pub use registry::{ConnectHandler, ConnectionRegistry};
pub use room::{Room, RoomInfo};
