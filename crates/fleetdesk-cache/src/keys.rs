//! Cache key builders.
//!
//! Cached pages live under `fleetdesk:page:{path}:{fingerprint}` where the
//! fingerprint is the SHA-256 of the serialized list query. Evicting a path
//! is then a single prefix delete.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Prefix applied to all FleetDesk cache keys.
const PREFIX: &str = "fleetdesk";

/// Key for one cached rendering of `path`.
pub fn page(path: &str, fingerprint: &str) -> String {
    format!("{PREFIX}:page:{path}:{fingerprint}")
}

/// Key prefix shared by every cached rendering of `path` and the paths below it.
pub fn page_prefix(path: &str) -> String {
    format!("{PREFIX}:page:{}", path.trim_end_matches('/'))
}

/// Hex SHA-256 of the JSON form of `value`.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key() {
        assert_eq!(page("/admin/blog", "abc"), "fleetdesk:page:/admin/blog:abc");
        assert_eq!(page_prefix("/admin/blog/"), "fleetdesk:page:/admin/blog");
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let a = fingerprint(&serde_json::json!({"page": 1, "status": "draft"})).unwrap();
        let b = fingerprint(&serde_json::json!({"page": 1, "status": "draft"})).unwrap();
        let c = fingerprint(&serde_json::json!({"page": 2, "status": "draft"})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
