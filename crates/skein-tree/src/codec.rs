//! Conversions between tree entries and the CRDT value representation.
//!
//! Entries are stored as plain `Any` maps (`{hash, mtime}` and `{size}`),
//! the same shape a JavaScript Yjs writer produces when it sets an object
//! value. Numbers coming back from other writers may arrive as `f64`, so
//! decoding accepts both integer and floating representations.

use std::collections::HashMap;

use skein_types::{BlobHash, BlobInfo, FileNode};
use yrs::Any;

use crate::error::{TreeError, TreeResult};

pub(crate) const HASH_KEY: &str = "hash";
pub(crate) const MTIME_KEY: &str = "mtime";
pub(crate) const SIZE_KEY: &str = "size";

pub(crate) fn node_to_any(node: &FileNode) -> Any {
    let mut map = HashMap::new();
    map.insert(HASH_KEY.to_string(), Any::from(node.hash.to_hex()));
    map.insert(MTIME_KEY.to_string(), Any::from(node.mtime_ms));
    Any::from(map)
}

pub(crate) fn info_to_any(info: &BlobInfo) -> Any {
    let mut map = HashMap::new();
    map.insert(SIZE_KEY.to_string(), Any::from(info.size as i64));
    Any::from(map)
}

pub(crate) fn any_to_node(key: &str, value: &Any) -> TreeResult<FileNode> {
    let map = as_map(key, value)?;
    let hash_hex = match map.get(HASH_KEY) {
        Some(Any::String(s)) => s.as_ref(),
        _ => return Err(malformed(key, "missing or non-string hash")),
    };
    let hash = BlobHash::from_hex(hash_hex)
        .map_err(|e| malformed(key, &format!("bad hash: {e}")))?;
    let mtime_ms = match map.get(MTIME_KEY) {
        Some(any) => as_i64(key, any)?,
        None => return Err(malformed(key, "missing mtime")),
    };
    Ok(FileNode::new(hash, mtime_ms))
}

pub(crate) fn any_to_info(key: &str, value: &Any) -> TreeResult<BlobInfo> {
    let map = as_map(key, value)?;
    let size = match map.get(SIZE_KEY) {
        Some(any) => as_i64(key, any)?,
        None => return Err(malformed(key, "missing size")),
    };
    if size < 0 {
        return Err(malformed(key, "negative size"));
    }
    Ok(BlobInfo::new(size as u64))
}

fn as_map<'a>(key: &str, value: &'a Any) -> TreeResult<&'a HashMap<String, Any>> {
    match value {
        Any::Map(map) => Ok(map.as_ref()),
        _ => Err(malformed(key, "expected a map value")),
    }
}

fn as_i64(key: &str, value: &Any) -> TreeResult<i64> {
    match value {
        Any::BigInt(n) => Ok(*n),
        Any::Number(n) => Ok(*n as i64),
        _ => Err(malformed(key, "expected a numeric value")),
    }
}

fn malformed(key: &str, reason: &str) -> TreeError {
    TreeError::MalformedEntry {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_types::now_ms;

    #[test]
    fn node_roundtrip() {
        let node = FileNode::new(BlobHash::from_bytes(b"content"), now_ms());
        let any = node_to_any(&node);
        let back = any_to_node("/a.txt", &any).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn info_roundtrip() {
        let info = BlobInfo::new(1234);
        let any = info_to_any(&info);
        let back = any_to_info("deadbeef", &any).unwrap();
        assert_eq!(info, back);
    }

    #[test]
    fn node_accepts_float_mtime_from_other_writers() {
        let hash = BlobHash::from_bytes(b"x");
        let mut map = HashMap::new();
        map.insert(HASH_KEY.to_string(), Any::from(hash.to_hex()));
        map.insert(MTIME_KEY.to_string(), Any::from(1_700_000_000_000.0_f64));
        let node = any_to_node("/f", &Any::from(map)).unwrap();
        assert_eq!(node.mtime_ms, 1_700_000_000_000);
    }

    #[test]
    fn non_map_value_is_malformed() {
        let err = any_to_node("/f", &Any::from("just a string")).unwrap_err();
        assert!(matches!(err, TreeError::MalformedEntry { .. }));
    }

    #[test]
    fn missing_hash_is_malformed() {
        let mut map = HashMap::new();
        map.insert(MTIME_KEY.to_string(), Any::from(1_i64));
        assert!(any_to_node("/f", &Any::from(map)).is_err());
    }

    #[test]
    fn bad_hex_hash_is_malformed() {
        let mut map = HashMap::new();
        map.insert(HASH_KEY.to_string(), Any::from("not-hex"));
        map.insert(MTIME_KEY.to_string(), Any::from(1_i64));
        assert!(any_to_node("/f", &Any::from(map)).is_err());
    }

    #[test]
    fn negative_size_is_malformed() {
        let mut map = HashMap::new();
        map.insert(SIZE_KEY.to_string(), Any::from(-1_i64));
        assert!(any_to_info("hash", &Any::from(map)).is_err());
    }
}
