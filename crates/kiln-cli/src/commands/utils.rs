//! Helpers shared by the commands.

use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// Resolve `path` against `cwd` unless it is absolute.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Project root: `--cwd` (relative to the current directory) or the current
/// directory itself.
pub fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir().context("Failed to get current directory")?;
    let root = match cwd {
        Some(dir) => resolve_path(dir, &current),
        None => current,
    };
    std::fs::metadata(&root).with_path(&root)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn resolve_path_keeps_absolute_paths() {
        let cwd = Path::new("/project");
        assert_eq!(resolve_path(Path::new("/etc/kiln.toml"), cwd), PathBuf::from("/etc/kiln.toml"));
        assert_eq!(resolve_path(Path::new("dist"), cwd), PathBuf::from("/project/dist"));
    }

    #[test]
    fn missing_root_is_file_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = project_root(Some(&missing)).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(path) if path == missing));
    }
}
