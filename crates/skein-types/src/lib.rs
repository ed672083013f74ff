//! Foundation types for Skein, a CRDT-backed collaborative filesystem.
//!
//! This crate provides the core identifiers and metadata records used
//! throughout the Skein system. Every other Skein crate depends on
//! `skein-types`.
//!
//! # Key Types
//!
//! - [`BlobHash`] — Content-addressed identifier (SHA-256 hash of exact bytes)
//! - [`FileNode`] — One path's current revision: blob reference plus mtime
//! - [`BlobInfo`] — Size metadata for a stored blob
//!
//! Hashes are computed over the exact byte sequence, never a decoded string.
//! This is load-bearing: multi-byte UTF-8 content and trailing newlines must
//! produce distinct hashes on every writer, or replicas disagree about which
//! blob a path points to.

pub mod error;
pub mod hash;
pub mod node;

pub use error::TypeError;
pub use hash::BlobHash;
pub use node::{now_ms, BlobInfo, FileNode};
