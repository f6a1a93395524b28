//! Cache key computation using BLAKE3 content-addressed hashing.

use blake3::Hasher;

use crate::Module;

/// Current cache format version. Increment when the stored layout changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Content-addressed cache key (BLAKE3 hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Create a cache key from a hex string.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get the cache key as a hex string.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the key for one module run through one loader chain.
///
/// The key is a BLAKE3 hash of:
/// 1. Cache format version and crate version
/// 2. Module id
/// 3. Raw module content
/// 4. Loader chain fingerprint (loader names and options)
pub fn compute_cache_key(module: &Module, chain_fingerprint: &str) -> CacheKey {
    let mut hasher = Hasher::new();
    hasher.update(&CACHE_FORMAT_VERSION.to_le_bytes());
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hasher.update(b"\0");
    hasher.update(module.id.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(blake3::hash(module.content()).as_bytes());
    hasher.update(chain_fingerprint.as_bytes());
    CacheKey(hasher.finalize().to_hex().to_string())
}
