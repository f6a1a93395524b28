//! The module dependency graph.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::dependency_chain::DependencyChain;
use crate::error::{GraphError, Result};
use crate::module::{Dependency, DependencyTarget};
use crate::{Module, ModuleId};

/// Modules keyed by id, kept in insertion (discovery) order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleGraph {
    modules: IndexMap<ModuleId, Module>,
    entry: Option<ModuleId>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module. Ids are unique and there is at most one entry.
    pub fn add_module(&mut self, module: Module) -> Result<()> {
        if self.modules.contains_key(&module.id) {
            return Err(GraphError::DuplicateModule(module.id));
        }
        if module.is_entry {
            if let Some(existing) = &self.entry {
                return Err(GraphError::DuplicateEntry(existing.clone()));
            }
            self.entry = Some(module.id.clone());
        }
        self.modules.insert(module.id.clone(), module);
        Ok(())
    }

    pub fn entry(&self) -> Option<&ModuleId> {
        self.entry.as_ref()
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    pub fn try_get(&self, id: &ModuleId) -> Result<&Module> {
        self.get(id)
            .ok_or_else(|| GraphError::ModuleNotFound(id.clone()))
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Module ids in lexical order.
    pub fn sorted_ids(&self) -> Vec<&ModuleId> {
        let mut ids: Vec<_> = self.modules.keys().collect();
        ids.sort();
        ids
    }

    /// Bundled dependencies of `id` accepted by `follow`, in declaration order.
    pub fn dependencies_where<F>(&self, id: &ModuleId, follow: F) -> Vec<&ModuleId>
    where
        F: Fn(&Dependency) -> bool,
    {
        let Some(module) = self.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<&ModuleId> = Vec::new();
        for dep in module.dependencies.iter().filter(|dep| follow(dep)) {
            if let Some(target) = dep.target_module() {
                if !out.contains(&target) {
                    out.push(target);
                }
            }
        }
        out
    }

    pub fn dependencies(&self, id: &ModuleId) -> Vec<&ModuleId> {
        self.dependencies_where(id, |_| true)
    }

    /// Modules that import `id`, in discovery order.
    pub fn dependents(&self, id: &ModuleId) -> Vec<&ModuleId> {
        self.modules
            .values()
            .filter(|module| {
                module
                    .dependencies
                    .iter()
                    .any(|dep| dep.target_module() == Some(id))
            })
            .map(|module| &module.id)
            .collect()
    }

    /// Distinct external package names referenced anywhere in the graph.
    pub fn externals(&self) -> BTreeSet<&str> {
        self.modules
            .values()
            .flat_map(|module| module.dependencies.iter())
            .filter_map(|dep| match &dep.target {
                DependencyTarget::External(name) => Some(name.as_str()),
                DependencyTarget::Module(_) => None,
            })
            .collect()
    }

    /// Modules reachable from `roots` following `follow`, dependencies first.
    ///
    /// The order is a depth-first post-order that visits dependencies in
    /// declaration order, so it is stable for identical graphs. Modules already
    /// on the current path are skipped, which keeps the walk finite on cyclic
    /// input.
    pub fn post_order<F>(&self, roots: &[&ModuleId], follow: F) -> Vec<ModuleId>
    where
        F: Fn(&Dependency) -> bool,
    {
        let mut visited = FxHashSet::default();
        let mut order = Vec::new();

        for root in roots {
            if !self.contains(root) || !visited.insert((*root).clone()) {
                continue;
            }
            // (module, index of the next dependency to look at)
            let mut stack: Vec<(ModuleId, usize)> = vec![((*root).clone(), 0)];
            while let Some((current, next)) = stack.last_mut() {
                let deps = self.dependencies_where(current, &follow);
                if let Some(dep) = deps.get(*next) {
                    *next += 1;
                    if visited.insert((*dep).clone()) {
                        let dep = (*dep).clone();
                        stack.push((dep, 0));
                    }
                } else {
                    order.push(current.clone());
                    stack.pop();
                }
            }
        }

        order
    }

    /// First cycle of static edges found walking from the entry, if any.
    ///
    /// Dynamic imports load lazily at runtime and never close a cycle.
    pub fn find_cycle(&self) -> Option<DependencyChain> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Gray,
            Black,
        }

        let mut marks: IndexMap<&ModuleId, Mark> = IndexMap::new();
        let roots: Vec<&ModuleId> = match &self.entry {
            Some(entry) => std::iter::once(entry).chain(self.modules.keys()).collect(),
            None => self.modules.keys().collect(),
        };

        for root in roots {
            if marks.contains_key(root) {
                continue;
            }
            let mut path: Vec<&ModuleId> = vec![root];
            let mut cursors: Vec<usize> = vec![0];
            marks.insert(root, Mark::Gray);

            while let (Some(current), Some(cursor)) = (path.last().copied(), cursors.last_mut()) {
                let deps = self.dependencies_where(current, |dep| dep.kind.is_static());
                match deps.get(*cursor) {
                    Some(dep) => {
                        *cursor += 1;
                        match marks.get(dep) {
                            Some(Mark::Gray) => {
                                let start = path.iter().position(|id| id == dep).unwrap_or(0);
                                let mut cycle: Vec<ModuleId> =
                                    path[start..].iter().map(|id| (*id).clone()).collect();
                                cycle.push((*dep).clone());
                                return Some(DependencyChain::new(cycle));
                            }
                            Some(Mark::Black) => {}
                            None => {
                                marks.insert(*dep, Mark::Gray);
                                path.push(*dep);
                                cursors.push(0);
                            }
                        }
                    }
                    None => {
                        marks.insert(current, Mark::Black);
                        path.pop();
                        cursors.pop();
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::DependencyKind;
    use crate::AssetKind;
    use std::path::PathBuf;

    fn id(s: &str) -> ModuleId {
        ModuleId::new(s).unwrap()
    }

    fn script(name: &str, deps: &[(&str, DependencyKind)]) -> Module {
        let mut builder = Module::builder(id(name), PathBuf::from(name), AssetKind::Script);
        for (dep, kind) in deps {
            builder = builder.dependency(Dependency::module(*dep, *kind, id(dep)));
        }
        builder.build()
    }

    #[test]
    fn rejects_duplicate_modules_and_entries() {
        let mut graph = ModuleGraph::new();
        graph.add_module(script("a.js", &[])).unwrap();
        assert!(matches!(
            graph.add_module(script("a.js", &[])),
            Err(GraphError::DuplicateModule(_))
        ));

        let mut graph = ModuleGraph::new();
        let first = Module::builder(id("a.js"), PathBuf::new(), AssetKind::Script).entry(true).build();
        let second = Module::builder(id("b.js"), PathBuf::new(), AssetKind::Script).entry(true).build();
        graph.add_module(first).unwrap();
        assert!(matches!(graph.add_module(second), Err(GraphError::DuplicateEntry(_))));
    }

    #[test]
    fn post_order_puts_dependencies_first() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(script("main.js", &[("a.js", DependencyKind::Import), ("b.js", DependencyKind::Import)]))
            .unwrap();
        graph.add_module(script("a.js", &[("c.js", DependencyKind::Import)])).unwrap();
        graph.add_module(script("b.js", &[("c.js", DependencyKind::Import)])).unwrap();
        graph.add_module(script("c.js", &[])).unwrap();

        let main = id("main.js");
        let order = graph.post_order(&[&main], |_| true);
        let names: Vec<_> = order.iter().map(ModuleId::as_str).collect();
        assert_eq!(names, vec!["c.js", "a.js", "b.js", "main.js"]);
    }

    #[test]
    fn post_order_can_skip_dynamic_edges() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(script("main.js", &[("lazy.js", DependencyKind::Dynamic)]))
            .unwrap();
        graph.add_module(script("lazy.js", &[])).unwrap();

        let main = id("main.js");
        let order = graph.post_order(&[&main], |dep| dep.kind.is_static());
        assert_eq!(order, vec![main]);
    }

    #[test]
    fn find_cycle_reports_the_loop() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(
                Module::builder(id("main.js"), PathBuf::new(), AssetKind::Script)
                    .entry(true)
                    .dependency(Dependency::module("./a", DependencyKind::Import, id("a.js")))
                    .build(),
            )
            .unwrap();
        graph.add_module(script("a.js", &[("b.js", DependencyKind::Import)])).unwrap();
        graph.add_module(script("b.js", &[("a.js", DependencyKind::Import)])).unwrap();

        let cycle = graph.find_cycle().expect("cycle");
        assert_eq!(cycle.format_chain(), "a.js -> b.js -> a.js");
    }

    #[test]
    fn dynamic_back_edges_are_not_cycles() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(script("main.js", &[("lazy.js", DependencyKind::Dynamic)]))
            .unwrap();
        graph
            .add_module(script("lazy.js", &[("main.js", DependencyKind::Import)]))
            .unwrap();
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn dependents_and_externals() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(
                Module::builder(id("main.js"), PathBuf::new(), AssetKind::Script)
                    .dependency(Dependency::module("./a", DependencyKind::Import, id("a.js")))
                    .dependency(Dependency::external("react", DependencyKind::Import, "react"))
                    .build(),
            )
            .unwrap();
        graph.add_module(script("a.js", &[])).unwrap();

        assert_eq!(graph.dependents(&id("a.js")), vec![&id("main.js")]);
        assert_eq!(graph.externals().into_iter().collect::<Vec<_>>(), vec!["react"]);
        assert!(graph.find_cycle().is_none());
    }
}
