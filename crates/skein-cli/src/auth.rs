//! Device-code login flow.
//!
//! The flow is an explicit state machine: `Requesting` obtains a device
//! code, `Polling` repeats until the server reports a terminal state, and
//! the outcome is one of `Authenticated`, `Denied`, or `Expired`. The
//! loop is cancellation-aware and bounded by an overall deadline in
//! addition to the server-side grant TTL.

use std::time::Duration;

use anyhow::Context;
use skein_proto::{endpoints, DeviceAuthRequest, DeviceAuthResponse, DevicePollRequest,
    DevicePollResponse};
use tokio_util::sync::CancellationToken;

const CLIENT_NAME: &str = "skein-cli";

/// Terminal result of one login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceFlowOutcome {
    Authenticated { token: String, user: String },
    Denied,
    Expired,
    Cancelled,
}

pub struct DeviceFlow {
    base_url: String,
    http: reqwest::Client,
    /// Hard ceiling on the whole flow, independent of the grant TTL.
    timeout: Duration,
    cancel: CancellationToken,
}

impl DeviceFlow {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            timeout: Duration::from_secs(900),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// `Requesting` step: ask the server for a device grant.
    pub async fn request_grant(&self) -> anyhow::Result<DeviceAuthResponse> {
        let url = format!("{}{}", self.base_url, endpoints::DEVICE_AUTH);
        let resp = self
            .http
            .post(&url)
            .json(&DeviceAuthRequest {
                client_name: CLIENT_NAME.into(),
            })
            .send()
            .await
            .context("requesting device code")?;
        if !resp.status().is_success() {
            anyhow::bail!("device code request failed with status {}", resp.status());
        }
        resp.json().await.context("parsing device code response")
    }

    /// `Polling` step: loop until the grant resolves, the deadline passes,
    /// or the flow is cancelled. A deadline hit is reported as `Expired`;
    /// the server forgets the grant on its own schedule.
    pub async fn poll_until_resolved(
        &self,
        grant: &DeviceAuthResponse,
    ) -> anyhow::Result<DeviceFlowOutcome> {
        let interval = Duration::from_secs(grant.interval.max(1));
        let ttl = Duration::from_secs(grant.expires_in);
        let deadline = tokio::time::Instant::now() + self.timeout.min(ttl);
        let url = format!("{}{}", self.base_url, endpoints::DEVICE_TOKEN);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(DeviceFlowOutcome::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(DeviceFlowOutcome::Expired);
            }

            let resp = self
                .http
                .post(&url)
                .json(&DevicePollRequest {
                    device_code: grant.device_code.clone(),
                })
                .send()
                .await
                .context("polling device grant")?;
            if !resp.status().is_success() {
                anyhow::bail!("device poll failed with status {}", resp.status());
            }
            let poll: DevicePollResponse =
                resp.json().await.context("parsing device poll response")?;
            match poll {
                DevicePollResponse::Pending => continue,
                DevicePollResponse::Granted { token, user } => {
                    return Ok(DeviceFlowOutcome::Authenticated { token, user });
                }
                DevicePollResponse::Denied => return Ok(DeviceFlowOutcome::Denied),
                DevicePollResponse::Expired => return Ok(DeviceFlowOutcome::Expired),
            }
        }
    }

    /// Run the whole flow. `on_prompt` receives the grant so the caller
    /// can show the user code before polling starts.
    pub async fn run(
        &self,
        on_prompt: impl FnOnce(&DeviceAuthResponse),
    ) -> anyhow::Result<DeviceFlowOutcome> {
        let grant = self.request_grant().await?;
        on_prompt(&grant);
        self.poll_until_resolved(&grant).await
    }
}
