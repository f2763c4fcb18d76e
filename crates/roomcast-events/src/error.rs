use roomcast_schema::{Mismatch, SchemaError};

use crate::param::ParamType;

/// Errors raised while building or querying a taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The definitions document is malformed.
    #[error("invalid definition at \"{path}\": {message}")]
    Definition { path: String, message: String },

    /// A node does not match the event node structure.
    #[error("definition node \"{path}\" rejected: {mismatch}")]
    Structure { path: String, mismatch: Mismatch },

    /// No event exists at the given path.
    #[error("unknown event \"{0}\"")]
    UnknownEvent(String),

    /// No namespace exists at the given path.
    #[error("unknown namespace \"{0}\"")]
    UnknownNamespace(String),

    /// The definitions text is not valid JSON.
    #[error("definitions are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Loading the definitions file or the node contract failed.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl EventError {
    pub(crate) fn definition(path: &str, message: impl Into<String>) -> Self {
        Self::Definition {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Arguments that do not fit an event's declared payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid number of arguments for \"{event}\", expected {expected} got {actual}")]
    Arity {
        event: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "invalid type for argument {index} (\"{param}\") of \"{event}\", expected {expected} got {actual}"
    )]
    Type {
        event: String,
        index: usize,
        param: String,
        expected: ParamType,
        actual: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EventError>;
