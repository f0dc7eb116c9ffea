//! HTTP cache validation module
//!
//! `ETag` generation and `If-None-Match` handling for static assets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` built from body length and a content hash, e.g. `"1a2-9f3c..."`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Whether the client's `If-None-Match` header matches `etag`
///
/// Uses weak comparison (RFC 9110 §13.1.2): a `W/` prefix on either side is
/// ignored. Handles comma separated lists and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    let ours = opaque_tag(etag);

    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || opaque_tag(candidate) == ours
    })
}

fn opaque_tag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_quoted() {
        let etag = generate_etag(b"{\"layers\": []}");
        assert!(etag.starts_with("\"e-"));
        assert!(etag.ends_with('"'));
    }

    #[test]
    fn test_etag_tracks_content() {
        assert_eq!(generate_etag(b"same"), generate_etag(b"same"));
        assert_ne!(generate_etag(b"layer a"), generate_etag(b"layer b"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }
}
