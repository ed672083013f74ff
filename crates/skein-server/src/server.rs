use std::sync::Arc;

use tokio::net::TcpListener;

use crate::auth::AuthProvider;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::ServerState;

/// Skein sync server.
pub struct SkeinServer {
    state: ServerState,
}

impl SkeinServer {
    pub fn new(config: ServerConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            state: ServerState::new(config, auth),
        }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests on the configured address.
    pub async fn serve(self) -> ServerResult<()> {
        let addr = self.state.config().bind_addr;
        let app = self.router();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("skein server listening on {addr}");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
