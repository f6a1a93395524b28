//! Error types for graph construction.

use thiserror::Error;

use crate::ModuleId;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("module id cannot be empty")]
    EmptyModuleId,

    #[error("module already present in graph: {0}")]
    DuplicateModule(ModuleId),

    #[error("graph already has an entry module: {0}")]
    DuplicateEntry(ModuleId),

    #[error("module not found in graph: {0}")]
    ModuleNotFound(ModuleId),

    #[error("asset '{0}' was emitted twice with different contents")]
    ConflictingAsset(String),

    #[error("module {module} is already assigned to chunk '{chunk}'")]
    ModuleAlreadyChunked { module: ModuleId, chunk: String },
}
