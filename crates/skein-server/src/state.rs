use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use rand::distributions::Alphanumeric;
use rand::Rng;
use skein_proto::{AuthMethod, DeviceAuthResponse, DevicePollResponse};
use skein_store::InMemoryContentStore;
use skein_tree::FileTree;

use crate::auth::{AuthProvider, Identity};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// One hosted project: its authoritative CRDT document plus the blob
/// store backing it.
pub struct ProjectEntry {
    pub tree: FileTree,
    pub store: Arc<InMemoryContentStore>,
}

impl ProjectEntry {
    fn new() -> Self {
        let store = Arc::new(InMemoryContentStore::new());
        Self {
            tree: FileTree::new(store.clone()),
            store,
        }
    }
}

enum GrantState {
    Pending,
    Granted { token: String, user: String },
    Denied,
}

struct DeviceGrant {
    user_code: String,
    state: GrantState,
    expires_at: Instant,
}

/// Shared server state handed to every handler via axum `State`.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServerConfig,
    auth: Arc<dyn AuthProvider>,
    projects: RwLock<HashMap<String, Arc<ProjectEntry>>>,
    // device_code → grant
    grants: Mutex<HashMap<String, DeviceGrant>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                auth,
                projects: RwLock::new(HashMap::new()),
                grants: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub async fn authenticate(&self, method: &AuthMethod) -> ServerResult<Identity> {
        self.inner.auth.authenticate(method).await
    }

    // ---- Projects ----

    pub fn create_project(&self, id: &str) -> ServerResult<()> {
        let mut projects = self.inner.projects.write().expect("lock poisoned");
        if projects.contains_key(id) {
            return Err(ServerError::ProjectExists(id.to_string()));
        }
        projects.insert(id.to_string(), Arc::new(ProjectEntry::new()));
        tracing::info!(project = id, "created project");
        Ok(())
    }

    pub fn project(&self, id: &str) -> ServerResult<Arc<ProjectEntry>> {
        let projects = self.inner.projects.read().expect("lock poisoned");
        projects
            .get(id)
            .cloned()
            .ok_or_else(|| ServerError::ProjectNotFound(id.to_string()))
    }

    // ---- Device-code grants ----

    /// Start a grant and hand back the codes the client needs.
    pub fn begin_device_grant(&self, client_name: &str) -> DeviceAuthResponse {
        let device_code = random_code(40);
        let user_code = format!(
            "{}-{}",
            random_code(4).to_uppercase(),
            random_code(4).to_uppercase()
        );
        let ttl = self.inner.config.device_grant_ttl;

        let mut grants = self.inner.grants.lock().expect("lock poisoned");
        // Abandoned grants are never polled again, so sweep them here
        // rather than letting the map grow with every login attempt.
        let now = Instant::now();
        grants.retain(|_, grant| grant.expires_at >= now);
        grants.insert(
            device_code.clone(),
            DeviceGrant {
                user_code: user_code.clone(),
                state: GrantState::Pending,
                expires_at: Instant::now() + ttl,
            },
        );
        tracing::info!(client = client_name, user_code, "device grant started");

        DeviceAuthResponse {
            device_code,
            user_code,
            verification_url: self.inner.config.verification_url.clone(),
            expires_in: ttl.as_secs(),
            interval: self.inner.config.device_poll_interval_secs,
        }
    }

    /// Resolve the current state of a grant. Terminal states consume the
    /// grant; polling an unknown code reports it as expired.
    pub fn poll_device_grant(&self, device_code: &str) -> DevicePollResponse {
        let mut grants = self.inner.grants.lock().expect("lock poisoned");
        let Some(grant) = grants.get(device_code) else {
            return DevicePollResponse::Expired;
        };
        if grant.expires_at < Instant::now() {
            grants.remove(device_code);
            return DevicePollResponse::Expired;
        }
        match &grant.state {
            GrantState::Pending => DevicePollResponse::Pending,
            GrantState::Granted { token, user } => {
                let resp = DevicePollResponse::Granted {
                    token: token.clone(),
                    user: user.clone(),
                };
                grants.remove(device_code);
                resp
            }
            GrantState::Denied => {
                grants.remove(device_code);
                DevicePollResponse::Denied
            }
        }
    }

    /// Approve the grant carrying `user_code` (normally done from the web
    /// approval page). Returns `false` when no pending grant matches.
    pub fn approve_device(&self, user_code: &str, token: &str, user: &str) -> bool {
        self.resolve_grant(user_code, GrantState::Granted {
            token: token.to_string(),
            user: user.to_string(),
        })
    }

    /// Deny the grant carrying `user_code`.
    pub fn deny_device(&self, user_code: &str) -> bool {
        self.resolve_grant(user_code, GrantState::Denied)
    }

    fn resolve_grant(&self, user_code: &str, state: GrantState) -> bool {
        let mut grants = self.inner.grants.lock().expect("lock poisoned");
        for grant in grants.values_mut() {
            if grant.user_code == user_code && matches!(grant.state, GrantState::Pending) {
                grant.state = state;
                return true;
            }
        }
        false
    }
}

fn random_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
