//! Pull/push synchronization for Skein projects.
//!
//! Drives full-project sync cycles against a remote HTTP API: CRDT deltas
//! travel as binary updates, blob bytes travel separately by hash, and a
//! tree is only marked as synced once the whole cycle (including blob
//! transfer) has succeeded.
//!
//! A pull cycle moves through `Fetch → Merge → BlobTransfer`; a push cycle
//! through `Diff → BlobUpload → Push`. Any failure surfaces the phase it
//! happened in and leaves the local tree in a consistent state: CRDT
//! updates apply as atomic units, so cancellation can never produce a
//! half-merged document.

pub mod engine;
pub mod error;
pub mod http;
pub mod manager;
pub mod project;
pub mod transport;

pub use engine::SyncEngine;
pub use error::{SyncError, SyncPhase, SyncResult};
pub use http::HttpRemote;
pub use manager::SyncManager;
pub use project::ProjectSync;
pub use transport::RemoteTransport;
