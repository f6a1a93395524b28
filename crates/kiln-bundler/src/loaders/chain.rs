use std::sync::Arc;

use indexmap::IndexMap;
use kiln_config::LoaderRule;
use tracing::trace;

use super::{Content, Loader, LoaderContext, LoaderRegistry};
use crate::{BuildConfig, Error, Module, Result, RuleTable};

/// The instantiated loaders of one rule.
#[derive(Debug, Clone)]
pub struct LoaderChain {
    rule: String,
    steps: Vec<Arc<dyn Loader>>,
    fingerprint: String,
}

impl LoaderChain {
    pub fn new(rule: &LoaderRule, steps: Vec<Arc<dyn Loader>>) -> Self {
        // Loader names and options identify the chain in cache keys.
        let fingerprint = rule
            .loaders
            .iter()
            .map(|l| format!("{}:{}", l.loader, l.options))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            rule: rule.name.clone(),
            steps,
            fingerprint,
        }
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run every step in order. The first failing step aborts the chain.
    pub fn apply(&self, module: &Module, config: &BuildConfig) -> Result<Content> {
        let cx = LoaderContext {
            module,
            config,
            rule: &self.rule,
        };
        let mut content = Content::Bytes(module.content().to_vec());
        for step in &self.steps {
            trace!(module = %module.id, step = step.name(), input = content.variant(), "loader step");
            content = step
                .transform(content, &cx)
                .map_err(|e| Error::transform(module.id.as_str(), step.name(), format!("{:#}", e)))?;
        }
        Ok(content)
    }
}

/// Chains for every rule of a table, keyed by rule name.
#[derive(Debug, Default)]
pub struct ChainSet {
    chains: IndexMap<String, LoaderChain>,
}

impl ChainSet {
    pub fn build(rules: &RuleTable, registry: &LoaderRegistry) -> Result<Self> {
        let mut chains = IndexMap::new();
        for rule in rules.rules() {
            chains.insert(rule.name.clone(), registry.build_chain(rule)?);
        }
        Ok(Self { chains })
    }

    pub fn get(&self, rule: &str) -> Option<&LoaderChain> {
        self.chains.get(rule)
    }

    pub fn for_module(&self, module: &Module) -> Result<&LoaderChain> {
        self.get(&module.rule).ok_or_else(|| Error::UnresolvedAssetType {
            path: module.id.to_string(),
        })
    }
}
