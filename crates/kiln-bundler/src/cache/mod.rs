//! Persistent transform cache.
//!
//! Loader chain output is stored per module so unchanged files skip their
//! loaders on the next build.
//!
//! # Architecture
//!
//! - **Content-addressed**: keys are BLAKE3 hashes of the module id, its raw
//!   content and the loader chain fingerprint
//! - **Automatic invalidation**: any change to an input changes the key
//! - **redb backend**: a single database file at `<cache.dir>/cache.redb`
//!
//! Cache failures never fail a build: callers log them and transform afresh.

mod key;
mod storage;

pub use key::{CACHE_FORMAT_VERSION, CacheKey, compute_cache_key};
pub use storage::{CacheError, CacheStore, CachedTransform};

use std::path::Path;

use crate::{Content, LoaderChain, Module};

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Cache of loader chain results.
pub struct TransformCache {
    store: CacheStore,
}

impl TransformCache {
    /// Open or create the cache in `dir`.
    pub fn open(dir: &Path) -> CacheResult<Self> {
        Ok(Self {
            store: CacheStore::open(dir)?,
        })
    }

    pub fn get(&self, module: &Module, chain: &LoaderChain) -> CacheResult<Option<Content>> {
        let key = compute_cache_key(module, chain.fingerprint());
        Ok(self.store.get(&key)?.map(|cached| cached.content))
    }

    pub fn put(&self, module: &Module, chain: &LoaderChain, content: &Content) -> CacheResult<()> {
        let key = compute_cache_key(module, chain.fingerprint());
        self.store.put(&key, &CachedTransform::new(content.clone()))
    }

    pub fn len(&self) -> CacheResult<usize> {
        self.store.len()
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        self.store.is_empty()
    }

    pub fn clear(&self) -> CacheResult<()> {
        self.store.clear()
    }
}
