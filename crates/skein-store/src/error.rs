use skein_types::BlobHash;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(BlobHash),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        expected: BlobHash,
        computed: BlobHash,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
