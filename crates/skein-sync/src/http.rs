//! HTTP implementation of [`RemoteTransport`] over the Skein sync API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use skein_proto::{endpoints, AuthMethod, ErrorBody};
use skein_types::BlobHash;

use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteTransport;

const OCTET_STREAM: &str = "application/octet-stream";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Remote transport speaking the Skein HTTP sync API via reqwest.
pub struct HttpRemote {
    base_url: String,
    auth: AuthMethod,
    http: reqwest::Client,
}

impl HttpRemote {
    /// Create a client targeting `base_url` (e.g. `https://app.skein.dev`).
    pub fn new(base_url: &str, auth: AuthMethod) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.auth.header_value() {
            Some(value) => req.header(AUTHORIZATION, value),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> SyncResult<Response> {
        self.authorized(req)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{what}: {e}")))
    }

    /// Map a non-2xx response to the error taxonomy. `not_found` names
    /// the resource-specific error for a 404.
    async fn ensure_success(
        resp: Response,
        not_found: impl FnOnce() -> SyncError,
    ) -> SyncResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = error_message(resp).await;
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(message),
            StatusCode::NOT_FOUND => not_found(),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                SyncError::Validation(message)
            }
            _ => SyncError::Network(format!("unexpected status {status}: {message}")),
        })
    }
}

/// Best-effort extraction of the server's error body.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if !text.is_empty() => text,
        Err(_) => status.to_string(),
    }
}

#[async_trait]
impl RemoteTransport for HttpRemote {
    async fn fetch_state(&self, project: &str) -> SyncResult<Vec<u8>> {
        let url = self.url(&endpoints::project(project));
        let resp = self.send(self.http.get(&url), "fetch project state").await?;
        let resp = Self::ensure_success(resp, || SyncError::ProjectNotFound(project.into())).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SyncError::Network(format!("read project state body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn push_update(&self, project: &str, update: &[u8]) -> SyncResult<()> {
        let url = self.url(&endpoints::project(project));
        let req = self
            .http
            .patch(&url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(update.to_vec());
        let resp = self.send(req, "push project update").await?;
        Self::ensure_success(resp, || SyncError::ProjectNotFound(project.into())).await?;
        Ok(())
    }

    async fn fetch_blob(&self, project: &str, hash: &BlobHash) -> SyncResult<Vec<u8>> {
        let url = self.url(&endpoints::blob(project, hash));
        let resp = self.send(self.http.get(&url), "fetch blob").await?;
        let resp = Self::ensure_success(resp, || SyncError::BlobNotFound(*hash)).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SyncError::Network(format!("read blob body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn blob_exists(&self, project: &str, hash: &BlobHash) -> SyncResult<bool> {
        let url = self.url(&endpoints::blob(project, hash));
        let resp = self.send(self.http.head(&url), "check blob").await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => {
                Self::ensure_success(resp, || SyncError::BlobNotFound(*hash)).await?;
                Ok(true)
            }
        }
    }

    async fn upload_blob(&self, project: &str, hash: &BlobHash, bytes: &[u8]) -> SyncResult<()> {
        let url = self.url(&endpoints::blob(project, hash));
        let req = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(bytes.to_vec());
        let resp = self.send(req, "upload blob").await?;
        Self::ensure_success(resp, || SyncError::ProjectNotFound(project.into())).await?;
        Ok(())
    }
}
