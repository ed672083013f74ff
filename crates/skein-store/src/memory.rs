use std::collections::HashMap;
use std::sync::RwLock;

use skein_types::BlobHash;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// In-memory, HashMap-based content store.
///
/// Serves as the local blob cache for sync clients, the backing store for
/// the embedded server, and the store used in tests. All blobs are held in
/// memory behind a `RwLock` for safe concurrent access.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<BlobHash, Vec<u8>>>,
}

impl InMemoryContentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all blob hashes in the store.
    pub fn all_hashes(&self) -> Vec<BlobHash> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut hashes: Vec<BlobHash> = map.keys().copied().collect();
        hashes.sort();
        hashes
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<BlobHash> {
        let hash = BlobHash::from_bytes(bytes);
        let mut map = self.blobs.write().expect("lock poisoned");
        // Idempotent: identical bytes always map to the same hash, so a
        // second put of the same content is a no-op.
        map.entry(hash).or_insert_with(|| bytes.to_vec());
        Ok(hash)
    }

    fn get(&self, hash: &BlobHash) -> StoreResult<Vec<u8>> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(hash).cloned().ok_or(StoreError::NotFound(*hash))
    }

    fn contains(&self, hash: &BlobHash) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(hash))
    }

    fn size(&self, hash: &BlobHash) -> StoreResult<u64> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(hash)
            .map(|b| b.len() as u64)
            .ok_or(StoreError::NotFound(*hash))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
