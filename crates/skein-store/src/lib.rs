//! Content-addressed blob storage for Skein.
//!
//! Every blob is an immutable byte sequence identified by the SHA-256 hash
//! of those exact bytes. The store is a pure key-value map from hash to
//! content: it never interprets blob contents and never mutates a stored
//! blob.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] — `HashMap`-based store for tests, the sync
//!   client's local cache, and the embedded server.
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. `put` of identical bytes is idempotent; duplicate writes are not an
//!    error, they are the dedup mechanism working.
//! 3. Concurrent reads are always safe (blobs are immutable).
//! 4. Sizes are byte lengths. Character counts are never correct here.
//! 5. All errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
