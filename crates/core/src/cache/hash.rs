//! Row keys for the SQLite store.

use sha2::{Digest, Sha256};

/// Compute the primary key for a stored entry.
///
/// URLs can be long and carry arbitrary query strings, so rows are keyed by
/// the SHA-256 of the key with the original kept alongside.
pub fn compute_entry_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_entry_key("https://example.com/about");
        let hash2 = compute_entry_key("https://example.com/about");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_query_sensitive() {
        let plain = compute_entry_key("https://example.com/search");
        let query = compute_entry_key("https://example.com/search?q=1");
        assert_ne!(plain, query);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_entry_key("https://example.com");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
