use skein_store::StoreError;
use skein_tree::TreeError;
use skein_types::BlobHash;
use thiserror::Error;

/// Phase of a sync cycle, used to contextualize failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    /// Pull: fetching the remote CRDT state.
    Fetch,
    /// Pull: merging the fetched update locally.
    Merge,
    /// Pull: downloading missing blobs and materializing files.
    BlobTransfer,
    /// Push: computing the local delta.
    Diff,
    /// Push: uploading blobs the remote lacks.
    BlobUpload,
    /// Push: transmitting the delta.
    Push,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Merge => "merge",
            Self::BlobTransfer => "blob-transfer",
            Self::Diff => "diff",
            Self::BlobUpload => "blob-upload",
            Self::Push => "push",
        };
        write!(f, "{name}")
    }
}

/// Errors from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("file not found in project {project}: {path}")]
    FileNotFound { project: String, path: String },

    #[error("remote blob not found: {0}")]
    BlobNotFound(BlobHash),

    #[error("network error: {0}")]
    Network(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// Reserved. CRDT merge never conflicts today; kept so callers can
    /// already match on it.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("sync cancelled")]
    Cancelled,

    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: SyncPhase,
        #[source]
        source: Box<SyncError>,
    },

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Wrap this error with the sync phase it occurred in.
    ///
    /// Cancellation and already-wrapped errors pass through unchanged so
    /// callers see a single phase tag, not a chain of them.
    pub fn in_phase(self, phase: SyncPhase) -> Self {
        match self {
            Self::Cancelled => Self::Cancelled,
            Self::Phase { .. } => self,
            other => Self::Phase {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// The phase tag, if this error carries one.
    pub fn phase(&self) -> Option<SyncPhase> {
        match self {
            Self::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Result alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
