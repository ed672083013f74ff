use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from protocol encoding/decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("payload too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u32),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// JSON body carried on non-2xx responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
