//! Content hashing for cache-busting file names.

/// Number of hex characters kept from the content hash (`[hash:8]`).
pub const HASH_LENGTH: usize = 8;

/// Truncated BLAKE3 hex digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hex = blake3::hash(bytes).to_hex().to_string();
    hex.truncate(HASH_LENGTH);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_short_and_stable() {
        let a = content_hash(b"body { color: red }");
        assert_eq!(a.len(), HASH_LENGTH);
        assert_eq!(a, content_hash(b"body { color: red }"));
        assert_ne!(a, content_hash(b"body { color: blue }"));
    }
}
