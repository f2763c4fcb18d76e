/// Errors that can occur on a transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection is closed.
    #[error("connection {0} is closed")]
    Closed(String),

    /// The underlying write failed.
    #[error("send on connection {id} failed: {message}")]
    Send { id: String, message: String },
}

pub type Result<T> = std::result::Result<T, TransportError>;
