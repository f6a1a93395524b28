//! Lifecycle plugins.
//!
//! Plugins run during the post-processing phase, after chunk membership is
//! fixed. Each one receives the [`BuildGraph`] mutably and the immutable
//! [`BuildConfig`]. Failures are reported as [`Error::PluginError`] naming
//! the plugin, except for the external manifest check which has its own kind.
//!
//! [`Error::PluginError`]: crate::Error::PluginError

mod add_asset;
mod copy;
mod define;
mod external_manifest;
mod html;
mod minify_css;
mod minify_js;
mod registry;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{BuildConfig, BuildGraph};

pub use add_asset::AddAssetPlugin;
pub use copy::{CopyPattern, CopyPlugin};
pub use define::DefinePlugin;
pub use external_manifest::{ExternalManifest, ExternalManifestPlugin};
pub use html::{DEFAULT_TEMPLATE, HtmlPlugin};
pub use minify_css::MinifyCssPlugin;
pub use minify_js::{MinifyJsPlugin, minify_script};
pub use registry::{PluginFactory, PluginRegistry};

pub trait BuildPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Run once over the chunked graph.
    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()>;
}

/// Deserialize plugin options; `null` means all defaults.
pub(crate) fn parse_options<T: DeserializeOwned + Default>(options: &Value) -> anyhow::Result<T> {
    if options.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(options.clone())?)
}

/// Expand `{env}` and `{public_path}` in an option value.
pub(crate) fn expand(template: &str, config: &BuildConfig) -> String {
    template
        .replace("{env}", config.env().as_str())
        .replace("{public_path}", config.public_path())
}
