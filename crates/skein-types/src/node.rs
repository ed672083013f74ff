use serde::{Deserialize, Serialize};

use crate::hash::BlobHash;

/// One path's current revision: which blob it points to and when it was
/// last written.
///
/// Invariant: every `FileNode`'s hash has a corresponding [`BlobInfo`]
/// entry, created atomically with the node write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub hash: BlobHash,
    /// Milliseconds since the Unix epoch.
    pub mtime_ms: i64,
}

impl FileNode {
    pub fn new(hash: BlobHash, mtime_ms: i64) -> Self {
        Self { hash, mtime_ms }
    }
}

/// Size metadata for a blob referenced from the file tree.
///
/// Sizes are byte lengths, never character counts. The actual bytes live
/// in the content store, not in the CRDT document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub size: u64,
}

impl BlobInfo {
    pub fn new(size: u64) -> Self {
        Self { size }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
