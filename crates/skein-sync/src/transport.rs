use async_trait::async_trait;
use skein_types::BlobHash;

use crate::error::SyncResult;

/// Transport interface for a remote Skein project host.
///
/// CRDT state and deltas are opaque binary payloads; blobs are addressed
/// by content hash. Implementations map transport failures to
/// `SyncError::Network`, missing credentials to `SyncError::Auth`, and
/// absent resources to the relevant not-found variant, never a silent
/// default.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Full CRDT state of the project as one binary update.
    async fn fetch_state(&self, project: &str) -> SyncResult<Vec<u8>>;

    /// Apply a binary CRDT delta to the remote project.
    async fn push_update(&self, project: &str, update: &[u8]) -> SyncResult<()>;

    /// Raw bytes of one blob.
    async fn fetch_blob(&self, project: &str, hash: &BlobHash) -> SyncResult<Vec<u8>>;

    /// Existence check by hash (HEAD request), used to skip uploads the
    /// remote does not need.
    async fn blob_exists(&self, project: &str, hash: &BlobHash) -> SyncResult<bool>;

    /// Upload one blob. The server verifies the bytes hash to `hash`.
    async fn upload_blob(&self, project: &str, hash: &BlobHash, bytes: &[u8]) -> SyncResult<()>;
}
