use roomcast_events::{EventError, PayloadError};
use roomcast_schema::SchemaError;
use roomcast_transport::TransportError;

/// Errors that can occur in connection, room and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The event does not travel in the requested direction.
    #[error("event \"{event}\" {reason}")]
    Direction { event: String, reason: &'static str },

    /// Arguments do not fit the event's payload.
    #[error("payload mismatch: {0}")]
    Payload(#[from] PayloadError),

    /// The descriptor does not belong to the connection's taxonomy.
    #[error("unknown event \"{0}\"")]
    UnknownEvent(String),

    /// No room with this name.
    #[error("unknown room \"{0}\"")]
    RoomNotFound(String),

    /// A room with this name already exists.
    #[error("room \"{0}\" already exists")]
    RoomExists(String),

    /// The room's identity list is in the other mode.
    #[error("room \"{room}\" is not using a {expected}")]
    ListMode { room: String, expected: &'static str },

    /// The connection has been closed.
    #[error("connection {0} is closed")]
    Closed(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// Hub settings are inconsistent.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// Taxonomy build or lookup error.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Settings document loading or validation error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl HubError {
    /// True for lookups of events, namespaces or rooms that do not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            HubError::UnknownEvent(_)
                | HubError::RoomNotFound(_)
                | HubError::Event(EventError::UnknownEvent(_) | EventError::UnknownNamespace(_))
        )
    }
}

impl From<TransportError> for HubError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed(id) => HubError::Closed(id),
            other => HubError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
