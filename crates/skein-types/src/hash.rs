use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::TypeError;

/// Content-addressed identifier for a blob.
///
/// A `BlobHash` is the SHA-256 hash of the blob's exact byte sequence.
/// Identical content always produces the same `BlobHash`, making blobs
/// deduplicatable across files and projects.
///
/// The wire and CRDT-map representation is the lowercase 64-character hex
/// string, so that writers in other languages agree on map keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobHash([u8; 32]);

impl BlobHash {
    /// Compute a `BlobHash` from raw bytes.
    ///
    /// Hashing happens over the byte sequence as-is. Callers must not
    /// normalize line endings or re-encode text first.
    pub fn from_bytes(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&digest);
        Self(arr)
    }

    /// Create a `BlobHash` from a pre-computed digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Verify that `data` hashes to this value.
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::from_bytes(data) == *self
    }
}

impl fmt::Debug for BlobHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobHash({})", self.short_hex())
    }
}

impl fmt::Display for BlobHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for BlobHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialized as the hex string rather than a byte array: the hash doubles
// as a JSON value and as a CRDT map key, and both must match what
// non-Rust writers produce.
impl Serialize for BlobHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlobHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_is_deterministic() {
        let data = b"hello world";
        let h1 = BlobHash::from_bytes(data);
        let h2 = BlobHash::from_bytes(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_data_produces_different_hashes() {
        let h1 = BlobHash::from_bytes(b"hello");
        let h2 = BlobHash::from_bytes(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn trailing_newline_changes_hash() {
        // The historical CLI/web divergence: "bar1" and "bar1\n" must
        // never collapse to the same hash.
        let h1 = BlobHash::from_bytes(b"bar1");
        let h2 = BlobHash::from_bytes(b"bar1\n");
        assert_ne!(h1, h2);
    }

    #[test]
    fn multibyte_content_hashes_over_bytes() {
        let text = "Hello, 世界! 🚀";
        let h1 = BlobHash::from_bytes(text.as_bytes());
        let h2 = BlobHash::from_bytes(text.as_bytes());
        assert_eq!(h1, h2);
        assert!(text.as_bytes().len() > text.chars().count());
    }

    #[test]
    fn known_sha256_vector() {
        // SHA-256("abc")
        let h = BlobHash::from_bytes(b"abc");
        assert_eq!(
            h.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hex_roundtrip() {
        let h = BlobHash::from_bytes(b"test");
        let parsed = BlobHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = BlobHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            BlobHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let h = BlobHash::from_bytes(b"test");
        let display = format!("{h}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, h.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        let h = BlobHash::from_bytes(b"test");
        assert_eq!(h.short_hex().len(), 8);
    }

    #[test]
    fn verify_correct_and_tampered() {
        let h = BlobHash::from_bytes(b"original");
        assert!(h.verify(b"original"));
        assert!(!h.verify(b"tampered"));
    }

    #[test]
    fn serde_roundtrip_as_hex_string() {
        let h = BlobHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.contains(&h.to_hex()));
        let parsed: BlobHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, parsed);
    }
}
