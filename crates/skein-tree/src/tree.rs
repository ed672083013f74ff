use std::sync::{Arc, Mutex};

use skein_store::ContentStore;
use skein_types::{now_ms, BlobHash, BlobInfo, FileNode};
use yrs::updates::decoder::Decode;
use yrs::updates::encoder::Encode;
use yrs::{Doc, Map, MapRef, Out, ReadTxn, StateVector, Transact, Update};

use crate::codec;
use crate::error::{TreeError, TreeResult};

const FILES_MAP: &str = "files";
const BLOBS_MAP: &str = "blobs";

/// CRDT document mapping file paths to content-addressed blobs.
///
/// Writers on different replicas mutate their own `FileTree` freely; deltas
/// exchanged through [`update_since_synced`] / [`apply_update`] merge
/// conflict-free, and all replicas converge to identical `files`/`blobs`
/// contents once every update has been delivered.
///
/// The tree records *references*; blob bytes are put into the attached
/// [`ContentStore`] before the reference is written, so a hash reachable
/// from `files` always has size metadata in `blobs` and (locally-written)
/// bytes in the store.
///
/// [`update_since_synced`]: FileTree::update_since_synced
/// [`apply_update`]: FileTree::apply_update
pub struct FileTree {
    doc: Doc,
    files: MapRef,
    blobs: MapRef,
    store: Arc<dyn ContentStore>,
    /// Baseline state vector recorded by `mark_synced`. Deltas are
    /// computed against this, never against an empty vector.
    baseline: Mutex<StateVector>,
}

impl FileTree {
    /// Create an empty tree backed by `store`.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        let doc = Doc::new();
        let files = doc.get_or_insert_map(FILES_MAP);
        let blobs = doc.get_or_insert_map(BLOBS_MAP);
        Self {
            doc,
            files,
            blobs,
            store,
            baseline: Mutex::new(StateVector::default()),
        }
    }

    /// The content store this tree writes blobs into.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    // ---- Mutation ----

    /// Write `content` at `path`.
    ///
    /// The blob is stored first, then the `files` and `blobs` entries are
    /// written in a single transaction, so no observer ever sees a file
    /// node whose hash lacks size metadata.
    pub fn write_file(&self, path: &str, content: &[u8]) -> TreeResult<BlobHash> {
        let hash = self.store.put(content)?;
        let node = FileNode::new(hash, now_ms());
        let info = BlobInfo::new(content.len() as u64);

        let mut txn = self.doc.transact_mut();
        self.files.insert(&mut txn, path, codec::node_to_any(&node));
        self.blobs
            .insert(&mut txn, hash.to_hex(), codec::info_to_any(&info));
        drop(txn);

        tracing::debug!(path, hash = %hash.short_hex(), size = content.len(), "wrote file");
        Ok(hash)
    }

    /// Remove the entry at `path`. Returns `false` if the path was absent.
    ///
    /// The `blobs` entry is intentionally retained: other paths (or other
    /// replicas) may still reference the same hash.
    pub fn delete_file(&self, path: &str) -> TreeResult<bool> {
        let mut txn = self.doc.transact_mut();
        let removed = self.files.remove(&mut txn, path).is_some();
        Ok(removed)
    }

    // ---- Lookup ----

    /// Read the bytes currently referenced by `path` from the store.
    pub fn read_file(&self, path: &str) -> TreeResult<Vec<u8>> {
        let node = self.file_node(path)?;
        Ok(self.store.get(&node.hash)?)
    }

    /// The file node for `path`, or `PathNotFound`.
    pub fn file_node(&self, path: &str) -> TreeResult<FileNode> {
        let txn = self.doc.transact();
        match self.files.get(&txn, path) {
            Some(Out::Any(any)) => codec::any_to_node(path, &any),
            Some(_) => Err(TreeError::MalformedEntry {
                key: path.to_string(),
                reason: "unexpected shared type".to_string(),
            }),
            None => Err(TreeError::PathNotFound(path.to_string())),
        }
    }

    /// Size metadata for `hash`, if any node has recorded it.
    pub fn blob_info(&self, hash: &BlobHash) -> TreeResult<Option<BlobInfo>> {
        let hex = hash.to_hex();
        let txn = self.doc.transact();
        match self.blobs.get(&txn, &hex) {
            Some(Out::Any(any)) => Ok(Some(codec::any_to_info(&hex, &any)?)),
            Some(_) => Err(TreeError::MalformedEntry {
                key: hex,
                reason: "unexpected shared type".to_string(),
            }),
            None => Ok(None),
        }
    }

    /// `true` if `path` has an entry.
    pub fn contains_file(&self, path: &str) -> bool {
        let txn = self.doc.transact();
        self.files.get(&txn, path).is_some()
    }

    /// All paths currently present. Order is not meaningful.
    pub fn list_files(&self) -> Vec<String> {
        let txn = self.doc.transact();
        self.files.keys(&txn).map(|k| k.to_string()).collect()
    }

    /// All `(path, node)` pairs. Fails on the first malformed entry.
    pub fn file_nodes(&self) -> TreeResult<Vec<(String, FileNode)>> {
        let paths = self.list_files();
        let mut nodes = Vec::with_capacity(paths.len());
        for path in paths {
            nodes.push((path.clone(), self.file_node(&path)?));
        }
        Ok(nodes)
    }

    /// Number of file entries.
    pub fn len(&self) -> usize {
        let txn = self.doc.transact();
        self.files.len(&txn) as usize
    }

    /// `true` if no files are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- Sync surface ----

    /// Delta covering everything changed since the last [`mark_synced`].
    ///
    /// For an unchanged tree this is not empty but a few bytes of
    /// structural framing; callers must treat a small floor as "nothing
    /// to send", not compare against zero.
    ///
    /// [`mark_synced`]: FileTree::mark_synced
    pub fn update_since_synced(&self) -> Vec<u8> {
        let baseline = self.baseline.lock().expect("lock poisoned").clone();
        let txn = self.doc.transact();
        txn.encode_diff_v1(&baseline)
    }

    /// Delta relative to an externally supplied encoded state vector.
    pub fn update_since(&self, state_vector: &[u8]) -> TreeResult<Vec<u8>> {
        let sv = StateVector::decode_v1(state_vector)
            .map_err(|e| TreeError::InvalidUpdate(e.to_string()))?;
        let txn = self.doc.transact();
        Ok(txn.encode_diff_v1(&sv))
    }

    /// Record the current document state as the new sync baseline.
    ///
    /// Does not mutate document content.
    pub fn mark_synced(&self) {
        let txn = self.doc.transact();
        *self.baseline.lock().expect("lock poisoned") = txn.state_vector();
    }

    /// Merge a remote binary update into this tree.
    ///
    /// CRDT merge is commutative and associative; concurrent writes to the
    /// same path resolve deterministically via register semantics and
    /// never produce a conflict error. The update applies as one atomic
    /// unit: a decode failure leaves the tree untouched.
    pub fn apply_update(&self, update: &[u8]) -> TreeResult<()> {
        let decoded =
            Update::decode_v1(update).map_err(|e| TreeError::InvalidUpdate(e.to_string()))?;
        let mut txn = self.doc.transact_mut();
        txn.apply_update(decoded)
            .map_err(|e| TreeError::InvalidUpdate(e.to_string()))
    }

    /// Full document state as a single binary update.
    pub fn encode_state(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&StateVector::default())
    }

    /// Encoded state vector: an opaque marker for "what this replica has
    /// seen".
    pub fn state_vector(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.state_vector().encode_v1()
    }
}

/// State vector covered by a standalone binary update, without touching
/// any existing tree.
///
/// Used to compute a delta relative to what a remote replica actually
/// holds, rather than a locally recorded baseline.
pub fn update_state_vector(update: &[u8]) -> TreeResult<Vec<u8>> {
    let decoded =
        Update::decode_v1(update).map_err(|e| TreeError::InvalidUpdate(e.to_string()))?;
    let doc = Doc::new();
    let mut txn = doc.transact_mut();
    txn.apply_update(decoded)
        .map_err(|e| TreeError::InvalidUpdate(e.to_string()))?;
    drop(txn);
    let txn = doc.transact();
    Ok(txn.state_vector().encode_v1())
}

impl std::fmt::Debug for FileTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTree")
            .field("file_count", &self.len())
            .finish()
    }
}
