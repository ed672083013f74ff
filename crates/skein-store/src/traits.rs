use skein_types::BlobHash;

use crate::error::StoreResult;

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written. Content-addressing guarantees this:
///   the same bytes always produce the same hash.
/// - `put` is idempotent. Writing bytes that are already present returns
///   the existing hash without error.
/// - Concurrent reads are always safe (blobs are immutable).
/// - The store never interprets blob contents; it is a pure key-value map.
/// - All I/O errors are propagated, never silently ignored.
pub trait ContentStore: Send + Sync {
    /// Store `bytes` and return their SHA-256 hash.
    ///
    /// The hash is computed over the exact byte sequence. If a blob with
    /// the same hash already exists, this is a no-op.
    fn put(&self, bytes: &[u8]) -> StoreResult<BlobHash>;

    /// Read a blob by hash.
    ///
    /// Returns `StoreError::NotFound` when the hash is absent.
    fn get(&self, hash: &BlobHash) -> StoreResult<Vec<u8>>;

    /// Check whether a blob exists in the store.
    fn contains(&self, hash: &BlobHash) -> StoreResult<bool>;

    /// Byte length of the stored blob.
    ///
    /// Always equal to `bytes.len()` at `put` time, never a character
    /// count.
    fn size(&self, hash: &BlobHash) -> StoreResult<u64>;
}
