//! Build configuration types.

mod helpers;
mod plugin;
mod resolve;
mod rules;
mod split;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

pub use plugin::{default_plugins, CacheConfig, PluginOptions};
pub use resolve::ResolveOptions;
pub use rules::{default_rules, LoaderOptions, LoaderRule};
pub use split::{SplitOptions, SplitPolicy};

use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use helpers::{default_css_public_path, default_entry, default_output_dir, default_public_path};

/// Main build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Entry file, relative to the project root
    #[serde(default = "default_entry")]
    pub entry: PathBuf,

    /// Output directory for generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// URL prefix for scripts and assets referenced from HTML and scripts
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// URL prefix for assets referenced from stylesheets (relative to `css/`)
    #[serde(default = "default_css_public_path")]
    pub css_public_path: String,

    #[serde(default)]
    pub resolve: ResolveOptions,

    /// Loader rule table, checked in order
    #[serde(default = "default_rules")]
    pub rules: Vec<LoaderRule>,

    /// Lifecycle plugins, run in order after splitting
    #[serde(default = "default_plugins")]
    pub plugins: Vec<PluginOptions>,

    #[serde(default)]
    pub split: SplitOptions,

    /// Enable minification (environment default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    /// Emit script source maps (environment default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<bool>,

    /// Emit stylesheet source maps (environment default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_source_maps: Option<bool>,

    /// Transform worker count (0 = available parallelism)
    #[serde(default)]
    pub concurrency: usize,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Bare packages provided at runtime without a manifest entry
    #[serde(default)]
    pub externals: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            output_dir: default_output_dir(),
            public_path: default_public_path(),
            css_public_path: default_css_public_path(),
            resolve: ResolveOptions::default(),
            rules: default_rules(),
            plugins: default_plugins(),
            split: SplitOptions::default(),
            minify: None,
            source_maps: None,
            css_source_maps: None,
            concurrency: 0,
            cache: CacheConfig::default(),
            externals: Vec::new(),
        }
    }
}

impl BuildOptions {
    /// Create from serde_json::Value
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::BuildOptions;
    /// use serde_json::json;
    /// use std::path::PathBuf;
    ///
    /// let options = BuildOptions::from_value(json!({
    ///     "entry": "src/index.js",
    ///     "minify": true
    /// }))
    /// .unwrap();
    /// assert_eq!(options.entry, PathBuf::from("src/index.js"));
    /// assert!(options.minify());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "build".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Fill unset flags with the environment's defaults.
    ///
    /// Development builds keep readable output with source maps; production
    /// builds are minified without maps. Explicit values are left alone.
    pub fn apply_environment(&mut self, env: Environment) {
        let production = env.is_production();
        self.minify.get_or_insert(production);
        self.source_maps.get_or_insert(!production);
        self.css_source_maps.get_or_insert(!production);
    }

    pub fn minify(&self) -> bool {
        self.minify.unwrap_or(false)
    }

    pub fn source_maps(&self) -> bool {
        self.source_maps.unwrap_or(false)
    }

    pub fn css_source_maps(&self) -> bool {
        self.css_source_maps.unwrap_or(false)
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginOptions> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    pub fn rule(&self, name: &str) -> Option<&LoaderRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }
}
