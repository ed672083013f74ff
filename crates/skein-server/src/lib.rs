//! HTTP server for the Skein sync API.
//!
//! Hosts project CRDT documents and their content-addressed blob stores
//! behind bearer-token authentication, plus the device-code grant
//! endpoints headless clients authenticate through. State lives in
//! memory; the server is the authority for "what does the project look
//! like", while clients hold independent replicas and sync deltas.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AllowAllAuth, AuthProvider, Identity, StaticTokenAuth};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::SkeinServer;
pub use state::ServerState;
