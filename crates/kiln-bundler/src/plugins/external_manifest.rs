//! Links prebuilt library bundles.
//!
//! A manifest lists the modules a separately built library bundle exposes
//! under a global `name`:
//!
//! ```json
//! { "name": "vendor_lib", "content": { "./node_modules/react/index.js": { "id": 1 } } }
//! ```
//!
//! Every external dependency of the graph must be provided by the manifest
//! or listed in `build.externals`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use super::{BuildPlugin, expand, parse_options};
use crate::resolver::package_name;
use crate::{BuildConfig, BuildGraph, Error};

pub const ANNOTATION: &str = "external-manifest";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalManifest {
    pub name: String,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl ExternalManifest {
    /// Package names that have at least one module in the manifest.
    pub fn packages(&self) -> BTreeSet<&str> {
        self.content
            .keys()
            .filter_map(|key| {
                let (_, rest) = key.rsplit_once("node_modules/")?;
                Some(package_name(rest).0)
            })
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ManifestOptions {
    manifest: String,
}

#[derive(Debug)]
pub struct ExternalManifestPlugin {
    manifest: String,
}

impl ExternalManifestPlugin {
    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        let options: ManifestOptions = parse_options(options)?;
        if options.manifest.is_empty() {
            anyhow::bail!("'manifest' is required");
        }
        Ok(Self {
            manifest: options.manifest,
        })
    }
}

impl BuildPlugin for ExternalManifestPlugin {
    fn name(&self) -> &str {
        "external-manifest"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        let path = config.resolve_path(expand(&self.manifest, config));
        if !config.runtime().is_file(&path) {
            return Err(Error::MissingExternalManifest { path }.into());
        }
        let text = config.runtime().read_to_string(&path)?;
        let manifest: ExternalManifest = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("invalid manifest {}: {}", path.display(), e))?;

        let provided = manifest.packages();
        let listed: BTreeSet<&str> = config.options().externals.iter().map(String::as_str).collect();
        let externals = graph.modules().externals();
        let missing: Vec<&str> = externals
            .iter()
            .copied()
            .filter(|name| !provided.contains(name) && !listed.contains(name))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "{} not provided by library '{}' nor listed in build.externals",
                missing.join(", "),
                manifest.name
            );
        }

        info!(library = %manifest.name, packages = provided.len(), "linked external library");
        let annotation = json!({
            "name": manifest.name,
            "packages": provided,
            "externals": externals,
        });
        graph.annotate(ANNOTATION, annotation);
        Ok(())
    }
}
