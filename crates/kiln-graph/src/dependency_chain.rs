//! Dependency chains for explaining how modules are connected.
//!
//! A chain is one path through the dependency graph. Discovery uses it to
//! report cycles (`src/a.js -> src/b.js -> src/a.js`).

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ModuleId;

/// A chain of dependencies from one module to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyChain {
    /// The path of module IDs, first importer first.
    pub path: Vec<ModuleId>,
    /// Depth of this chain (path length - 1)
    pub depth: usize,
}

impl DependencyChain {
    pub fn new(path: Vec<ModuleId>) -> Self {
        let depth = path.len().saturating_sub(1);
        Self { path, depth }
    }

    pub fn entry_point(&self) -> Option<&ModuleId> {
        self.path.first()
    }

    pub fn target(&self) -> Option<&ModuleId> {
        self.path.last()
    }

    /// Check if this chain contains a cycle (same module appears twice).
    pub fn has_cycle(&self) -> bool {
        let mut seen = FxHashSet::default();
        self.path.iter().any(|module| !seen.insert(module))
    }

    /// Format the chain as a human-readable string.
    ///
    /// Example: "src/main.js -> src/a.js -> src/main.js"
    pub fn format_chain(&self) -> String {
        self.path
            .iter()
            .map(ModuleId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Display for DependencyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_chain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[&str]) -> DependencyChain {
        DependencyChain::new(ids.iter().map(|s| ModuleId::new(s).unwrap()).collect())
    }

    #[test]
    fn formats_with_arrows() {
        let c = chain(&["a.js", "b.js", "a.js"]);
        assert_eq!(c.format_chain(), "a.js -> b.js -> a.js");
        assert_eq!(c.to_string(), c.format_chain());
        assert_eq!(c.depth, 2);
    }

    #[test]
    fn detects_repeated_modules() {
        assert!(chain(&["a.js", "b.js", "a.js"]).has_cycle());
        assert!(!chain(&["a.js", "b.js", "c.js"]).has_cycle());
    }

    #[test]
    fn empty_chain_has_zero_depth() {
        let c = DependencyChain::new(Vec::new());
        assert_eq!(c.depth, 0);
        assert!(c.entry_point().is_none());
    }
}
