//! Wire protocol for the Skein sync API.
//!
//! Defines the endpoint paths, authentication method, and JSON message
//! types exchanged between Skein clients (CLI, background sync) and a
//! Skein server. CRDT payloads travel as raw binary updates
//! (`application/octet-stream`); everything else is JSON.

pub mod auth;
pub mod device;
pub mod endpoint;
pub mod error;

pub use auth::AuthMethod;
pub use device::{DeviceAuthRequest, DeviceAuthResponse, DevicePollRequest, DevicePollResponse};
pub use endpoint::{endpoints, HealthResponse};
pub use error::{ErrorBody, ProtocolError, ProtocolResult};

/// Protocol version advertised by both sides.
pub const PROTOCOL_VERSION: u32 = 1;

/// Upper bound on a single binary CRDT update payload.
pub const MAX_UPDATE_SIZE: usize = 16 * 1024 * 1024;

/// Upper bound on a single blob upload.
pub const MAX_BLOB_SIZE: usize = 64 * 1024 * 1024;
