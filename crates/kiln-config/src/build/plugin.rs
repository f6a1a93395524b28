use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::build::helpers::{default_cache_dir, default_true};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Reuse transform results across builds
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache directory, relative to the project root
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Registered plugin name (`html`, `copy`, ...)
    pub name: String,

    /// Plugin-specific options
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,

    /// Execution order (lower values run earlier, ties keep list order)
    #[serde(default)]
    pub order: i32,

    /// Whether the plugin should run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Environment-specific overrides merged into this entry
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub profiles: HashMap<String, Value>,
}

impl PluginOptions {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
            order: 0,
            enabled: true,
            profiles: HashMap::new(),
        }
    }
}

/// Environment definitions, HTML, static copy, DLL linking and minification.
pub fn default_plugins() -> Vec<PluginOptions> {
    vec![
        PluginOptions::new("define", json!({ "env_file": "config/{env}.env.json" })),
        PluginOptions::new(
            "html",
            json!({
                "template": "public/index.html",
                "filename": "index.html",
                "inject": "body",
                "favicon": "favicon.ico",
            }),
        ),
        PluginOptions::new("copy", json!({ "patterns": [{ "from": "favicon.ico" }] })),
        PluginOptions::new(
            "external-manifest",
            json!({ "manifest": "build/dll/vendor-manifest.json" }),
        ),
        PluginOptions::new(
            "add-asset",
            json!({ "filepath": "build/dll/*.js", "output_path": "js", "hash": false }),
        ),
        PluginOptions::new("minify-css", json!({ "test": r"\.css$" })),
        PluginOptions::new("minify-js", Value::Null),
    ]
}
