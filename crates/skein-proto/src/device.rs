//! Device-code authentication messages.
//!
//! A headless client POSTs to the device endpoint, shows the returned user
//! code, and polls the token endpoint until the grant resolves. The poll
//! response is a tagged enum so each terminal state is explicit rather
//! than an error-string convention.

use serde::{Deserialize, Serialize};

/// Start a device-code grant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceAuthRequest {
    /// Client identifier shown to the user on the approval page.
    pub client_name: String,
}

/// Server response to a device-code request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceAuthResponse {
    /// Opaque code the client polls with. Never shown to the user.
    pub device_code: String,
    /// Short code the user enters in a browser.
    pub user_code: String,
    /// Where the user goes to approve the grant.
    pub verification_url: String,
    /// Seconds until the grant expires.
    pub expires_in: u64,
    /// Minimum seconds between polls.
    pub interval: u64,
}

/// Poll the state of a pending grant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DevicePollRequest {
    pub device_code: String,
}

/// Current state of a device-code grant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DevicePollResponse {
    /// The user has not acted yet; poll again after `interval`.
    Pending,
    /// The user approved; credentials are final.
    Granted { token: String, user: String },
    /// The user rejected the grant.
    Denied,
    /// The grant timed out server-side.
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_response_tags() {
        let json = serde_json::to_string(&DevicePollResponse::Pending).unwrap();
        assert_eq!(json, r#"{"status":"pending"}"#);

        let granted = DevicePollResponse::Granted {
            token: "tok".into(),
            user: "alice".into(),
        };
        let json = serde_json::to_string(&granted).unwrap();
        assert!(json.contains(r#""status":"granted""#));
        assert!(json.contains(r#""user":"alice""#));
    }

    #[test]
    fn poll_response_parse() {
        let parsed: DevicePollResponse =
            serde_json::from_str(r#"{"status":"denied"}"#).unwrap();
        assert_eq!(parsed, DevicePollResponse::Denied);

        let parsed: DevicePollResponse = serde_json::from_str(
            r#"{"status":"granted","token":"t","user":"u"}"#,
        )
        .unwrap();
        assert!(matches!(parsed, DevicePollResponse::Granted { .. }));
    }

    #[test]
    fn auth_response_roundtrip() {
        let resp = DeviceAuthResponse {
            device_code: "dc".into(),
            user_code: "ABCD-1234".into(),
            verification_url: "https://app.skein.dev/device".into(),
            expires_in: 900,
            interval: 5,
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: DeviceAuthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_code, "ABCD-1234");
        assert_eq!(back.interval, 5);
    }
}
