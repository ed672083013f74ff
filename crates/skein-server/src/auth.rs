use std::collections::HashMap;

use async_trait::async_trait;
use skein_proto::AuthMethod;

use crate::error::{ServerError, ServerResult};

/// An authenticated caller.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user: "anonymous".into(),
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self { user: name.into() }
    }
}

/// Maps presented credentials to an identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, method: &AuthMethod) -> ServerResult<Identity>;
}

/// Accepts every request, including anonymous ones. For tests and local
/// single-user serving.
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, method: &AuthMethod) -> ServerResult<Identity> {
        match method {
            AuthMethod::Bearer(token) => {
                let prefix = &token[..8.min(token.len())];
                Ok(Identity::user(format!("bearer:{prefix}")))
            }
            AuthMethod::Anonymous => Ok(Identity::anonymous()),
        }
    }
}

/// Fixed token table: token → user name.
pub struct StaticTokenAuth {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuth {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Single-token provider.
    pub fn single(token: impl Into<String>, user: impl Into<String>) -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(token.into(), user.into());
        Self { tokens }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, method: &AuthMethod) -> ServerResult<Identity> {
        match method {
            AuthMethod::Bearer(token) => match self.tokens.get(token) {
                Some(user) => Ok(Identity::user(user.clone())),
                None => Err(ServerError::AuthFailed("unknown token".into())),
            },
            AuthMethod::Anonymous => {
                Err(ServerError::AuthFailed("missing bearer token".into()))
            }
        }
    }
}
