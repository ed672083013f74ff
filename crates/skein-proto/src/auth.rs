use serde::{Deserialize, Serialize};

/// Authentication method for connecting to a Skein server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuthMethod {
    Bearer(String),
    Anonymous,
}

impl Default for AuthMethod {
    fn default() -> Self {
        Self::Anonymous
    }
}

impl AuthMethod {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Value for the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("Bearer {token}")),
            Self::Anonymous => None,
        }
    }

    /// Parse an `Authorization` header value.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.and_then(|v| v.strip_prefix("Bearer ")) {
            Some(token) if !token.is_empty() => Self::Bearer(token.to_string()),
            _ => Self::Anonymous,
        }
    }
}
