use skein_store::StoreError;
use thiserror::Error;

/// Errors from file tree operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// No entry for the requested path.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A map entry exists but does not decode into the expected shape.
    #[error("malformed entry for {key}: {reason}")]
    MalformedEntry { key: String, reason: String },

    /// A binary update payload could not be decoded or applied.
    #[error("invalid update payload: {0}")]
    InvalidUpdate(String),

    /// The content store rejected or lacked a blob.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
