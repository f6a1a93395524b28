//! Asset classification.
//!
//! Maps a module id to the first rule in the table whose patterns match it.
//! Patterns are compiled once, when the table is built.

use kiln_config::LoaderRule;
use regex::Regex;

use crate::{AssetKind, Error, Result};

#[derive(Debug)]
struct CompiledRule {
    rule: LoaderRule,
    test: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl CompiledRule {
    fn matches(&self, path: &str) -> bool {
        self.test.iter().any(|re| re.is_match(path)) && !self.exclude.iter().any(|re| re.is_match(path))
    }
}

/// Ordered rule table.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

fn compile(rule: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        Error::Config(format!("rule '{}' has an invalid pattern '{}': {}", rule, pattern, e))
    })
}

impl RuleTable {
    /// Compile `rules` in order. Rule names must be unique.
    pub fn new(rules: &[LoaderRule]) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = rules.iter().find(|rule| !seen.insert(rule.name.as_str())) {
            return Err(Error::Config(format!(
                "rule '{}' is declared more than once",
                duplicate.name
            )));
        }
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    test: rule
                        .test
                        .iter()
                        .map(|p| compile(&rule.name, p))
                        .collect::<Result<_>>()?,
                    exclude: rule
                        .exclude
                        .iter()
                        .map(|p| compile(&rule.name, p))
                        .collect::<Result<_>>()?,
                    rule: rule.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// First rule matching `path` (`/`-separated).
    pub fn classify(&self, path: &str) -> Result<&LoaderRule> {
        let path = path.replace('\\', "/");
        self.rules
            .iter()
            .find(|compiled| compiled.matches(&path))
            .map(|compiled| &compiled.rule)
            .ok_or(Error::UnresolvedAssetType { path })
    }

    pub fn kind_of(&self, path: &str) -> Result<AssetKind> {
        self.classify(path).map(|rule| rule.kind)
    }

    pub fn rules(&self) -> impl Iterator<Item = &LoaderRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
