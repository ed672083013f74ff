//! Delta computation and merge policy.
//!
//! A thin layer over the tree's CRDT surface: it decides *when* an update
//! is worth sending. The tie-break for concurrent edits to the same path
//! defers entirely to the underlying register semantics; there is no
//! custom merge logic anywhere in Skein.

use skein_tree::{FileTree, TreeResult};

/// An update encoding no changes still carries this much structural
/// framing (empty struct list plus empty delete set).
const EMPTY_UPDATE_CEILING: usize = 2;

/// Computes and applies incremental CRDT deltas between a local tree and
/// a remote counterpart.
pub struct SyncEngine;

impl SyncEngine {
    /// Delta relative to a remote-supplied encoded state vector.
    pub fn delta_since(tree: &FileTree, state_vector: &[u8]) -> TreeResult<Vec<u8>> {
        tree.update_since(state_vector)
    }

    /// Merge a remote update into the local tree.
    pub fn merge(tree: &FileTree, update: &[u8]) -> TreeResult<()> {
        tree.apply_update(update)
    }

    /// `true` when an update payload encodes no changes.
    pub fn is_noop(update: &[u8]) -> bool {
        update.len() <= EMPTY_UPDATE_CEILING
    }
}
