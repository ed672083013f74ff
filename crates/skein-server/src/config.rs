use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on a single binary CRDT update.
    pub max_update_size: usize,
    /// Upper bound on a single blob upload.
    pub max_blob_size: usize,
    /// How long a device-code grant stays pending before expiring.
    #[serde(with = "duration_secs")]
    pub device_grant_ttl: Duration,
    /// Minimum seconds clients should wait between device-flow polls.
    pub device_poll_interval_secs: u64,
    /// Approval page shown to users during the device flow.
    pub verification_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".parse().expect("valid default addr"),
            max_update_size: skein_proto::MAX_UPDATE_SIZE,
            max_blob_size: skein_proto::MAX_BLOB_SIZE,
            device_grant_ttl: Duration::from_secs(900),
            device_poll_interval_secs: 5,
            verification_url: "https://app.skein.dev/device".into(),
        }
    }
}

mod duration_secs {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
