use std::fmt;
use std::path::Path;
use std::sync::Arc;

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Stable identifier of a module.
///
/// Ids are paths relative to the project root with `/` separators, so they
/// compare and sort the same way on every platform. Modules outside the root
/// keep their absolute path. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref();
        if id.trim().is_empty() {
            return Err(GraphError::EmptyModuleId);
        }
        Ok(Self(Arc::from(id.replace('\\', "/"))))
    }

    /// Build an id for `path` relative to `root`.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self> {
        let cleaned = path.clean();
        let root = root.clean();
        let relative = cleaned.strip_prefix(&root).unwrap_or(cleaned.as_path());
        Self::new(relative.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without directories, e.g. `b.css`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File name without its final extension, e.g. `b` for `src/b.css`.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
