/// Errors that can occur while loading contracts or validating documents.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A document or contract file could not be read.
    #[error("failed to load document: {0}")]
    Load(String),

    /// The document is not valid JSON.
    #[error("document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The structure document itself is malformed.
    #[error("invalid structure at \"{path}\": {message}")]
    Contract { path: String, message: String },

    /// The document does not match its structure.
    #[error("validation failed: {0}")]
    ValidationFailed(crate::validator::Mismatch),
}

impl SchemaError {
    pub(crate) fn contract(path: &str, message: impl Into<String>) -> Self {
        Self::Contract {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
