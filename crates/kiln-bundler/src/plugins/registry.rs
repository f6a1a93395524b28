use std::collections::HashMap;

use kiln_config::PluginOptions;
use serde_json::Value;
use tracing::{debug, info_span};

use super::{
    AddAssetPlugin, BuildPlugin, CopyPlugin, DefinePlugin, ExternalManifestPlugin, HtmlPlugin,
    MinifyCssPlugin, MinifyJsPlugin,
};
use crate::{BuildConfig, BuildGraph, Error, Result};

/// Builds a plugin from its options.
pub type PluginFactory = fn(&Value) -> anyhow::Result<Box<dyn BuildPlugin>>;

/// Ordered list of plugins to run after splitting.
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
    plugins: Vec<Box<dyn BuildPlugin>>,
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            plugins: Vec::new(),
        }
    }

    /// Registry that knows every built-in plugin, with nothing scheduled.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("define", |o| Ok(Box::new(DefinePlugin::from_options(o)?)));
        registry.register("html", |o| Ok(Box::new(HtmlPlugin::from_options(o)?)));
        registry.register("copy", |o| Ok(Box::new(CopyPlugin::from_options(o)?)));
        registry.register("external-manifest", |o| {
            Ok(Box::new(ExternalManifestPlugin::from_options(o)?))
        });
        registry.register("add-asset", |o| Ok(Box::new(AddAssetPlugin::from_options(o)?)));
        registry.register("minify-css", |o| Ok(Box::new(MinifyCssPlugin::from_options(o)?)));
        registry.register("minify-js", |_| Ok(Box::new(MinifyJsPlugin)));
        registry
    }

    /// Built-ins scheduled from configuration.
    ///
    /// Entries run by `order`, ties in list order. Disabled entries are
    /// skipped. Unknown names and invalid options are configuration errors.
    pub fn from_options(options: &[PluginOptions]) -> Result<Self> {
        let mut registry = Self::with_builtins();
        let mut enabled: Vec<&PluginOptions> = options.iter().filter(|p| p.enabled).collect();
        enabled.sort_by_key(|p| p.order);
        for entry in enabled {
            let plugin = registry.create(entry)?;
            registry.add(plugin);
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, factory: PluginFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn create(&self, entry: &PluginOptions) -> Result<Box<dyn BuildPlugin>> {
        let factory = self
            .factories
            .get(&entry.name)
            .ok_or_else(|| Error::Config(format!("unknown plugin '{}'", entry.name)))?;
        factory(&entry.options).map_err(|e| {
            Error::Config(format!("invalid options for plugin '{}': {:#}", entry.name, e))
        })
    }

    /// Append a plugin after the configured ones.
    pub fn add(&mut self, plugin: Box<dyn BuildPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Apply every plugin in order, stopping at the first failure.
    pub fn run(&self, graph: &mut BuildGraph, config: &BuildConfig) -> Result<()> {
        for plugin in &self.plugins {
            let _span = info_span!("plugin", name = plugin.name()).entered();
            plugin
                .apply(graph, config)
                .map_err(|e| plugin_failure(plugin.name(), e))?;
            debug!("plugin applied");
        }
        Ok(())
    }
}

/// Keep kinds a plugin raised on purpose; flatten everything else.
fn plugin_failure(plugin: &str, error: anyhow::Error) -> Error {
    match error.downcast::<Error>() {
        Ok(error @ (Error::MissingExternalManifest { .. } | Error::PluginError { .. })) => error,
        Ok(other) => Error::plugin(plugin, other),
        Err(error) => Error::plugin(plugin, format!("{:#}", error)),
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
