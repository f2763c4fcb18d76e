//! Immutable taxonomy of typed, direction-restricted events.
//!
//! A definitions document is a tree of namespaces and events. Each event
//! declares its positional payload and which side may originate it:
//!
//! ```json
//! {
//!     "chat": {
//!         "type": "namespace",
//!         "message": {
//!             "type": "event",
//!             "payload": [{ "name": "username", "type": "string" }, { "name": "msg", "type": "string" }],
//!             "server_to_client": true,
//!             "client_to_server": true
//!         }
//!     }
//! }
//! ```
//!
//! [`Taxonomy::build`] checks every node against [`event_node_contract`] or
//! [`namespace_node_contract`] according to its `type`,
//! then freezes the tree. Events are addressed by their `::`-joined path
//! (`chat::message`) or by their [`EventId`].

pub mod contract;
pub mod descriptor;
pub mod error;
pub mod param;
pub mod taxonomy;

pub use contract::{event_node_contract, namespace_node_contract};
pub use descriptor::{EventDescriptor, EventId, PayloadParam};
pub use error::{EventError, PayloadError, Result};
pub use param::ParamType;
pub use taxonomy::{Child, Namespace, Taxonomy, PATH_SEPARATOR};
