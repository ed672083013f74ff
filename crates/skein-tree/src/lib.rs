//! Convergent file tree for Skein.
//!
//! A [`FileTree`] is a CRDT document (backed by yrs, the Rust port of Yjs)
//! holding two root maps:
//!
//! - `files`: path → `{hash, mtime}` — which blob each path points to
//! - `blobs`: hash-hex → `{size}` — byte-size metadata per referenced blob
//!
//! Entries are plain last-writer-wins registers, so concurrent writers
//! (CLI, web, background sync) merge without coordination and every
//! replica converges to the same contents regardless of delivery order.
//! Blob bytes themselves live out-of-band in a [`ContentStore`]; the
//! document only carries references.
//!
//! Incremental sync works through a recorded baseline state vector:
//! [`FileTree::update_since_synced`] emits only the changes made since the
//! last [`FileTree::mark_synced`], and [`FileTree::apply_update`] merges a
//! remote delta as one atomic unit.
//!
//! [`ContentStore`]: skein_store::ContentStore

mod codec;

pub mod error;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use tree::{update_state_vector, FileTree};
