//! The loader rule table.

use kiln_graph::AssetKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One loader step with its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderOptions {
    pub loader: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl LoaderOptions {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Value) -> Self {
        Self {
            loader: loader.into(),
            options,
        }
    }
}

/// Maps matching file paths to an asset kind and an ordered loader list.
///
/// A rule matches when any `test` pattern matches the `/`-separated path and
/// no `exclude` pattern does. Rules are checked in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderRule {
    pub name: String,

    pub test: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    pub kind: AssetKind,

    #[serde(rename = "use", default)]
    pub loaders: Vec<LoaderOptions>,
}

impl LoaderRule {
    pub fn new(name: impl Into<String>, test: &[&str], kind: AssetKind) -> Self {
        Self {
            name: name.into(),
            test: test.iter().map(|t| t.to_string()).collect(),
            exclude: Vec::new(),
            kind,
            loaders: Vec::new(),
        }
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.exclude.push(pattern.to_string());
        self
    }

    pub fn loader(mut self, loader: LoaderOptions) -> Self {
        self.loaders.push(loader);
        self
    }
}

/// Rules for scripts, stylesheets, Sass, images and fonts.
///
/// Application scripts skip `node_modules`; package code is matched by the
/// trailing `packages` rule so it can still land in the vendor chunk.
pub fn default_rules() -> Vec<LoaderRule> {
    vec![
        LoaderRule::new("scripts", &[r"\.(js|jsx)$"], AssetKind::Script)
            .exclude("node_modules")
            .loader(LoaderOptions::new("script")),
        LoaderRule::new("styles", &[r"\.css$"], AssetKind::Stylesheet)
            .loader(LoaderOptions::new("css")),
        LoaderRule::new("sass", &[r"\.(sass|scss)$"], AssetKind::Stylesheet)
            .loader(LoaderOptions::with_options(
                "command",
                json!({ "command": "sass", "args": ["--stdin", "--load-path={dir}"] }),
            ))
            .loader(LoaderOptions::new("css")),
        LoaderRule::new(
            "images",
            &[r"\.bmp$", r"\.gif$", r"\.jpe?g$", r"\.png$"],
            AssetKind::Image,
        )
        .loader(LoaderOptions::with_options(
            "url",
            json!({ "limit": 5 * 1024, "output_path": "assets/images" }),
        )),
        LoaderRule::new("fonts", &[r"\.(ttf|woff|woff2|eot|otf)$"], AssetKind::Font).loader(
            LoaderOptions::with_options(
                "url",
                json!({ "limit": 1024, "output_path": "assets/fonts" }),
            ),
        ),
        LoaderRule::new("packages", &[r"node_modules/.*\.(js|mjs|cjs)$"], AssetKind::Script)
            .loader(LoaderOptions::new("script")),
    ]
}
