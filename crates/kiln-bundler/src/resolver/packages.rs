//! Installed package lookup.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use super::try_file_or_dir;
use crate::Runtime;

/// Fields of `package.json` naming the entry file, in preference order.
const MAIN_FIELDS: &[&str] = &["browser", "module", "main"];

/// Split a bare specifier into package name and subpath.
///
/// `react` → (`react`, None); `@scope/pkg/lib/x` → (`@scope/pkg`, `lib/x`).
pub fn package_name(specifier: &str) -> (&str, Option<&str>) {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut split_at = None;
    let mut seen = 0;
    for (idx, ch) in specifier.char_indices() {
        if ch == '/' {
            seen += 1;
            if seen == segments {
                split_at = Some(idx);
                break;
            }
        }
    }
    match split_at {
        Some(idx) => {
            let rest = &specifier[idx + 1..];
            (&specifier[..idx], (!rest.is_empty()).then_some(rest))
        }
        None => (specifier, None),
    }
}

/// Entry file of an installed package.
pub(super) fn package_entry(package_dir: &Path, extensions: &[String], runtime: &dyn Runtime) -> Option<PathBuf> {
    let manifest = package_dir.join("package.json");
    if let Ok(source) = runtime.read_to_string(&manifest) {
        match serde_json::from_str::<Value>(&source) {
            Ok(json) => {
                let found = MAIN_FIELDS
                    .iter()
                    .filter_map(|field| json.get(*field).and_then(Value::as_str))
                    .find_map(|entry| try_file_or_dir(&package_dir.join(entry), extensions, runtime));
                if found.is_some() {
                    return found;
                }
            }
            Err(e) => warn!(path = %manifest.display(), error = %e, "ignoring invalid package.json"),
        }
    }
    try_file_or_dir(&package_dir.join("index"), extensions, runtime)
}
