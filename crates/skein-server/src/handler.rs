use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use skein_proto::{
    AuthMethod, DeviceAuthRequest, DevicePollRequest, DevicePollResponse, HealthResponse,
};
use skein_store::ContentStore;
use skein_types::BlobHash;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

const OCTET_STREAM: &str = "application/octet-stream";

fn auth_method(headers: &HeaderMap) -> AuthMethod {
    AuthMethod::from_header(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
}

async fn require_auth(state: &ServerState, headers: &HeaderMap) -> ServerResult<()> {
    state.authenticate(&auth_method(headers)).await.map(|_| ())
}

fn parse_hash(hex: &str) -> ServerResult<BlobHash> {
    BlobHash::from_hex(hex).map_err(|e| ServerError::Validation(format!("bad blob hash: {e}")))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

// ---- Project CRDT state ----

pub async fn create_project(
    State(state): State<ServerState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<StatusCode> {
    require_auth(&state, &headers).await?;
    state.create_project(&project_id)?;
    Ok(StatusCode::CREATED)
}

pub async fn get_project(
    State(state): State<ServerState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> ServerResult<impl IntoResponse> {
    require_auth(&state, &headers).await?;
    let entry = state.project(&project_id)?;
    let body = entry.tree.encode_state();
    Ok(([(CONTENT_TYPE, OCTET_STREAM)], body))
}

pub async fn patch_project(
    State(state): State<ServerState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<StatusCode> {
    require_auth(&state, &headers).await?;
    let limit = state.config().max_update_size;
    if body.len() > limit {
        return Err(ServerError::PayloadTooLarge {
            size: body.len(),
            limit,
        });
    }
    let entry = state.project(&project_id)?;
    entry.tree.apply_update(&body)?;
    tracing::debug!(project = %project_id, bytes = body.len(), "applied update");
    Ok(StatusCode::NO_CONTENT)
}

// ---- Blobs ----

pub async fn get_blob(
    State(state): State<ServerState>,
    Path((project_id, hash)): Path<(String, String)>,
    headers: HeaderMap,
) -> ServerResult<impl IntoResponse> {
    require_auth(&state, &headers).await?;
    let hash = parse_hash(&hash)?;
    let entry = state.project(&project_id)?;
    let bytes = entry
        .store
        .get(&hash)
        .map_err(|_| ServerError::BlobNotFound(hash.to_hex()))?;
    Ok(([(CONTENT_TYPE, OCTET_STREAM)], bytes))
}

pub async fn put_blob(
    State(state): State<ServerState>,
    Path((project_id, hash)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<StatusCode> {
    require_auth(&state, &headers).await?;
    let hash = parse_hash(&hash)?;
    let limit = state.config().max_blob_size;
    if body.len() > limit {
        return Err(ServerError::PayloadTooLarge {
            size: body.len(),
            limit,
        });
    }
    if !hash.verify(&body) {
        return Err(ServerError::HashMismatch);
    }
    let entry = state.project(&project_id)?;
    entry.store.put(&body)?;
    Ok(StatusCode::CREATED)
}

// ---- Device-code auth ----

pub async fn device_auth(
    State(state): State<ServerState>,
    Json(req): Json<DeviceAuthRequest>,
) -> Json<skein_proto::DeviceAuthResponse> {
    Json(state.begin_device_grant(&req.client_name))
}

pub async fn device_token(
    State(state): State<ServerState>,
    Json(req): Json<DevicePollRequest>,
) -> Json<DevicePollResponse> {
    Json(state.poll_device_grant(&req.device_code))
}
