use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How import specifiers are turned into files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Extensions probed, in order, when a specifier has none.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Specifier prefix → directory (relative to the project root).
    ///
    /// `@/components/Button` resolves under `src/components/Button` with the
    /// default `@ = "src"` alias.
    #[serde(default = "default_alias")]
    pub alias: IndexMap<String, PathBuf>,

    /// Directories searched for bare package specifiers.
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    [".js", ".jsx", ".scss"].iter().map(|s| s.to_string()).collect()
}

fn default_alias() -> IndexMap<String, PathBuf> {
    IndexMap::from([("@".to_string(), PathBuf::from("src"))])
}

fn default_modules() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            alias: default_alias(),
            modules: default_modules(),
        }
    }
}
