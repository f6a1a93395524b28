//! redb-backed cache storage.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use super::key::{CACHE_FORMAT_VERSION, CacheKey};
use crate::Content;

/// Maps cache keys to serialized transform results.
const CACHE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("transforms");

/// Error types for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Cache database error.
    #[error("cache database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// IO error.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<redb::Error> for CacheError {
    fn from(err: redb::Error) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

impl From<redb::DatabaseError> for CacheError {
    fn from(err: redb::DatabaseError) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

impl From<redb::TableError> for CacheError {
    fn from(err: redb::TableError) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

impl From<redb::TransactionError> for CacheError {
    fn from(err: redb::TransactionError) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

impl From<redb::StorageError> for CacheError {
    fn from(err: redb::StorageError) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

impl From<redb::CommitError> for CacheError {
    fn from(err: redb::CommitError) -> Self {
        CacheError::DatabaseError(err.to_string())
    }
}

/// A stored loader chain result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedTransform {
    pub format_version: u32,
    pub content: Content,
}

impl CachedTransform {
    pub fn new(content: Content) -> Self {
        Self {
            format_version: CACHE_FORMAT_VERSION,
            content,
        }
    }
}

/// Persistent cache store using redb.
pub struct CacheStore {
    db: Database,
}

impl CacheStore {
    /// Open or create a cache store at `<cache_dir>/cache.redb`.
    pub fn open(cache_dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(cache_dir)?;

        let db = Database::create(cache_dir.join("cache.redb"))?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CACHE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Entries written by another format version count as misses.
    pub fn get(&self, key: &CacheKey) -> Result<Option<CachedTransform>, CacheError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CACHE_TABLE)?;

        let Some(value) = table.get(key.as_hex())? else {
            return Ok(None);
        };
        let cached: CachedTransform = bincode::deserialize(value.value())
            .map_err(|e| CacheError::DeserializationError(e.to_string()))?;

        Ok((cached.format_version == CACHE_FORMAT_VERSION).then_some(cached))
    }

    pub fn put(&self, key: &CacheKey, cached: &CachedTransform) -> Result<(), CacheError> {
        let bytes =
            bincode::serialize(cached).map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            table.insert(key.as_hex(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CACHE_TABLE)?;
        Ok(table.iter()?.count())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<(), CacheError> {
        let write_txn = self.db.begin_write()?;
        {
            write_txn.delete_table(CACHE_TABLE)?;
            let _ = write_txn.open_table(CACHE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(())
    }
}
