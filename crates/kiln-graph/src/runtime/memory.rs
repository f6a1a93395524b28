//! In-memory runtime for tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// A file system that lives in a hash map.
///
/// Paths are cleaned on insert and lookup, so `/app/src/../a.js` and
/// `/app/a.js` refer to the same file. Directories exist implicitly whenever
/// a file lives below them.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuntime {
    files: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert(path.as_ref().clean(), content.into());
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = path.clean();
        self.files
            .read()
            .keys()
            .any(|file| file != &path && file.starts_with(&path))
    }
}

impl Runtime for MemoryRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files
            .read()
            .get(&path.clean())
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        if let Some(content) = self.files.read().get(&path.clean()) {
            return Ok(FileMetadata {
                size: content.len() as u64,
                is_dir: false,
                is_file: true,
                modified: None,
            });
        }
        if self.is_dir(path) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
                modified: None,
            });
        }
        Err(RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(&path.clean()) || self.is_dir(path)
    }

    fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<PathBuf>> {
        let dir = path.clean();
        if !self.is_dir(&dir) {
            return Err(RuntimeError::FileNotFound(path.to_path_buf()));
        }
        let mut entries: Vec<PathBuf> = self
            .files
            .read()
            .keys()
            .filter_map(|file| {
                let rest = file.strip_prefix(&dir).ok()?;
                let first = rest.components().next()?;
                Some(dir.join(first))
            })
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_implicit() {
        let runtime = MemoryRuntime::new()
            .with_file("/app/src/main.js", "import './a.js'")
            .with_file("/app/src/a.js", "")
            .with_file("/app/src/nested/b.js", "");

        assert!(runtime.exists(Path::new("/app/src")));
        assert!(!runtime.is_file(Path::new("/app/src")));
        assert!(runtime.is_file(Path::new("/app/src/../src/a.js")));

        let entries = runtime.read_dir(Path::new("/app/src")).unwrap();
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/app/src/a.js"),
                PathBuf::from("/app/src/main.js"),
                PathBuf::from("/app/src/nested"),
            ]
        );
    }

    #[test]
    fn clones_share_storage() {
        let runtime = MemoryRuntime::new();
        let clone = runtime.clone();
        clone.insert("/x.txt", "x");
        assert_eq!(runtime.read_to_string(Path::new("/x.txt")).unwrap(), "x");
        assert!(matches!(
            runtime.read_file(Path::new("/y.txt")),
            Err(RuntimeError::FileNotFound(_))
        ));
    }
}
