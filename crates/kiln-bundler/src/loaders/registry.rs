use std::collections::HashMap;
use std::sync::Arc;

use kiln_config::{LoaderOptions, LoaderRule};
use serde_json::Value;

use super::{CommandLoader, CssLoader, Loader, LoaderChain, ScriptLoader, UrlLoader};
use crate::{Error, Result};

/// Builds a loader from its options.
pub type LoaderFactory = fn(&Value) -> anyhow::Result<Arc<dyn Loader>>;

/// Loader name → factory.
pub struct LoaderRegistry {
    factories: HashMap<String, LoaderFactory>,
}

impl LoaderRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with `script`, `css`, `command` and `url`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("script", |_| Ok(Arc::new(ScriptLoader)));
        registry.register("css", |_| Ok(Arc::new(CssLoader)));
        registry.register("command", |options| Ok(Arc::new(CommandLoader::from_options(options)?)));
        registry.register("url", |options| Ok(Arc::new(UrlLoader::from_options(options)?)));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: LoaderFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, rule: &str, options: &LoaderOptions) -> Result<Arc<dyn Loader>> {
        let factory = self.factories.get(&options.loader).ok_or_else(|| {
            Error::Config(format!("rule '{}' uses unknown loader '{}'", rule, options.loader))
        })?;
        factory(&options.options).map_err(|e| {
            Error::Config(format!(
                "rule '{}': invalid options for loader '{}': {}",
                rule, options.loader, e
            ))
        })
    }

    /// Instantiate every step of a rule.
    pub fn build_chain(&self, rule: &LoaderRule) -> Result<LoaderChain> {
        let steps = rule
            .loaders
            .iter()
            .map(|options| self.create(&rule.name, options))
            .collect::<Result<Vec<_>>>()?;
        Ok(LoaderChain::new(rule, steps))
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
