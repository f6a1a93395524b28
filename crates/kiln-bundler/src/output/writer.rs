//! Atomic, validated writes into the output directory.
//!
//! Every file is first written next to its target with a `.tmp` suffix.
//! Only when all writes succeeded are the temp files renamed into place. If
//! anything fails, temp files and already renamed files are removed again.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::warn;

use crate::{Error, Result};

/// Directories that must never be used as (or cleaned as) an output directory.
const DANGEROUS_PATHS: &[&str] = &[
    "/", "/bin", "/boot", "/dev", "/etc", "/home", "/lib", "/opt", "/proc", "/root", "/sbin",
    "/sys", "/tmp", "/usr", "/var",
];

/// Absolute, cleaned output directory that is not a system directory.
pub fn validate_output_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    let absolute = if cleaned.is_absolute() {
        cleaned
    } else {
        std::env::current_dir()
            .map_err(|e| {
                Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
            })?
            .join(&cleaned)
            .clean()
    };

    if DANGEROUS_PATHS.iter().any(|p| absolute == Path::new(p)) {
        return Err(Error::InvalidOutputPath(format!(
            "refusing to write into system directory '{}'",
            absolute.display()
        )));
    }
    if let Some(home) = std::env::var_os("HOME") {
        if absolute == Path::new(&home) {
            return Err(Error::InvalidOutputPath(format!(
                "refusing to write into the home directory '{}'",
                absolute.display()
            )));
        }
    }
    Ok(absolute)
}

/// Resolve `file_name` under `base_dir`, rejecting anything that escapes it.
pub fn validate_output_path(base_dir: &Path, file_name: &str) -> Result<PathBuf> {
    if file_name.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }
    if file_name.is_empty() {
        return Err(Error::InvalidOutputPath("Filename is empty".to_string()));
    }

    let full_path = base_dir.join(Path::new(file_name).clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            file_name,
            base_dir.display(),
            full_path.display()
        )));
    }
    Ok(full_path)
}

/// Remove the contents of a previous build.
pub fn clean_output_dir(dir: &Path) -> Result<()> {
    let dir = validate_output_dir(dir)?;
    if dir.exists() {
        fs::remove_dir_all(&dir).map_err(|e| {
            Error::WriteFailure(format!("Failed to clean '{}': {}", dir.display(), e))
        })?;
    }
    Ok(())
}

/// Write `(relative name, content)` pairs under `dir` as one unit.
///
/// Returns the absolute paths written, in input order.
pub fn write_files(dir: &Path, files: &[(String, Vec<u8>)]) -> Result<Vec<PathBuf>> {
    let dir = validate_output_dir(dir)?;
    let operations = files
        .iter()
        .map(|(name, content)| Ok((validate_output_path(&dir, name)?, content.as_slice())))
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    write_files_atomic(&operations)?;
    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup(&temp_files, &[]);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = temp_path(target_path);
        fs::write(&temp, content).map_err(|e| {
            cleanup(&temp_files, &[]);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp.display(),
                e
            ))
        })?;
        temp_files.push((temp, target_path.clone()));
    }

    let mut renamed: Vec<PathBuf> = Vec::new();
    for (temp, target_path) in &temp_files {
        if let Err(e) = fs::rename(temp, target_path) {
            cleanup(&temp_files, &renamed);
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp.display(),
                target_path.display(),
                e
            )));
        }
        renamed.push(target_path.clone());
    }
    Ok(())
}

/// Best-effort rollback.
fn cleanup(temp_files: &[(PathBuf, PathBuf)], renamed: &[PathBuf]) {
    let leftovers = temp_files
        .iter()
        .map(|(temp, _)| temp)
        .chain(renamed.iter())
        .filter(|path| path.exists());
    for path in leftovers {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove file during rollback");
        }
    }
}
