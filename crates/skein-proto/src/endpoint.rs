use skein_types::BlobHash;

/// HTTP endpoint paths for the Skein sync API.
///
/// The axum router uses the `*_ROUTE` patterns; clients build concrete
/// URLs with the path helpers so the two can never drift apart.
pub mod endpoints {
    use super::*;

    pub const HEALTH: &str = "/api/health";
    pub const DEVICE_AUTH: &str = "/api/auth/device";
    pub const DEVICE_TOKEN: &str = "/api/auth/device/token";

    pub const PROJECT_ROUTE: &str = "/api/projects/:project_id";
    pub const BLOB_ROUTE: &str = "/api/projects/:project_id/blobs/:hash";

    /// Path for a project's CRDT state (GET full state, PATCH delta).
    pub fn project(project_id: &str) -> String {
        format!("/api/projects/{project_id}")
    }

    /// Path for one content-addressed blob (GET/HEAD/PUT).
    pub fn blob(project_id: &str, hash: &BlobHash) -> String {
        format!("/api/projects/{project_id}/blobs/{}", hash.to_hex())
    }
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub protocol_version: u32,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            protocol_version: crate::PROTOCOL_VERSION,
        }
    }
}
