//! Extension probing and directory index files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::Runtime;

fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    if !ext.starts_with('.') {
        os.push(".");
    }
    os.push(ext);
    PathBuf::from(os)
}

/// Try `candidate` as a file, then with each extension appended, then as a
/// directory containing `index` plus an extension.
pub fn try_file_or_dir(candidate: &Path, extensions: &[String], runtime: &dyn Runtime) -> Option<PathBuf> {
    if runtime.is_file(candidate) {
        return Some(candidate.to_path_buf());
    }

    for ext in extensions {
        let with_ext = with_suffix(candidate, ext);
        if runtime.is_file(&with_ext) {
            return Some(with_ext);
        }
    }

    if runtime.metadata(candidate).is_ok_and(|meta| meta.is_dir) {
        for ext in extensions {
            let index = with_suffix(&candidate.join("index"), ext);
            if runtime.is_file(&index) {
                return Some(index);
            }
        }
    }

    None
}
