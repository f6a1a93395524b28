use std::path::PathBuf;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_entry() -> PathBuf {
    PathBuf::from("src/main.jsx")
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub(crate) fn default_public_path() -> String {
    "/".to_string()
}

pub(crate) fn default_css_public_path() -> String {
    "../".to_string()
}

pub(crate) fn default_cache_dir() -> PathBuf {
    PathBuf::from("node_modules/.cache/kiln")
}

pub(crate) fn default_min_chunks() -> usize {
    2
}

pub(crate) fn default_vendor_pattern() -> String {
    "node_modules".to_string()
}
