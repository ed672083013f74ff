use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use skein_proto::ErrorBody;
use skein_store::StoreError;
use skein_tree::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("blob not found: {0}")]
    BlobNotFound(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("blob bytes do not hash to the addressed value")]
    HashMismatch,

    #[error("payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ProjectNotFound(_) | Self::BlobNotFound(_) => StatusCode::NOT_FOUND,
            Self::ProjectExists(_) => StatusCode::CONFLICT,
            Self::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Tree(_) => StatusCode::BAD_REQUEST,
            Self::HashMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "project_not_found",
            Self::ProjectExists(_) => "project_exists",
            Self::BlobNotFound(_) | Self::Store(StoreError::NotFound(_)) => "blob_not_found",
            Self::AuthFailed(_) => "auth_failed",
            Self::Validation(_) | Self::Tree(_) => "validation",
            Self::HashMismatch => "hash_mismatch",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            _ => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
