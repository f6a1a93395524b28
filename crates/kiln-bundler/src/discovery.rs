//! Module discovery.
//!
//! Walks the dependency graph depth-first from the entry file. Every file is
//! classified, read, scanned and resolved exactly once. Files on the current
//! walk path are marked gray and finished files black: reaching a gray file
//! again through static imports only is a cycle.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::resolver::{Resolution, Resolver};
use crate::scanner::Scanner;
use crate::{
    BuildConfig, Dependency, DependencyChain, DependencyKind, Error, Module, ModuleGraph, ModuleId,
    Result, RuleTable,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Gray,
    Black,
}

/// A module being visited: its resolved edges and the next one to follow.
struct Frame {
    module: Module,
    /// Edge kind that led here.
    via: DependencyKind,
    children: Vec<(PathBuf, DependencyKind)>,
    next: usize,
}

pub struct Discovery<'a> {
    config: &'a BuildConfig,
    rules: &'a RuleTable,
    scanner: &'a Scanner,
    resolver: &'a dyn Resolver,
}

impl<'a> Discovery<'a> {
    pub fn new(
        config: &'a BuildConfig,
        rules: &'a RuleTable,
        scanner: &'a Scanner,
        resolver: &'a dyn Resolver,
    ) -> Self {
        Self {
            config,
            rules,
            scanner,
            resolver,
        }
    }

    /// Discover every module reachable from the configured entry.
    pub fn run(&self) -> Result<ModuleGraph> {
        let entry = self.config.entry_path();
        if !self.config.runtime().is_file(&entry) {
            return Err(Error::ModuleNotFound {
                specifier: self.config.options().entry.to_string_lossy().into_owned(),
                importer: "build.entry".to_string(),
            });
        }

        let mut graph = ModuleGraph::new();
        let mut marks: FxHashMap<PathBuf, Mark> = FxHashMap::default();
        let mut stack: Vec<Frame> = Vec::new();

        marks.insert(entry.clone(), Mark::Gray);
        stack.push(self.load(&entry, true, DependencyKind::Import)?);

        while let Some(frame) = stack.last_mut() {
            let Some((child, kind)) = frame.children.get(frame.next).cloned() else {
                let Some(frame) = stack.pop() else { break };
                trace!(module = %frame.module.id, "finished");
                marks.insert(frame.module.path.clone(), Mark::Black);
                graph.add_module(frame.module)?;
                continue;
            };
            frame.next += 1;

            match marks.get(&child) {
                Some(Mark::Black) => {}
                Some(Mark::Gray) => {
                    if let Some(chain) = static_cycle(&stack, &child, kind) {
                        return Err(Error::CyclicDependency { chain });
                    }
                }
                None => {
                    marks.insert(child.clone(), Mark::Gray);
                    let frame = self.load(&child, false, kind)?;
                    stack.push(frame);
                }
            }
        }

        // A static cycle entered through a dynamic edge is not visible on the
        // walk path; check the finished graph for it.
        if let Some(chain) = graph.find_cycle() {
            return Err(Error::CyclicDependency { chain });
        }

        debug!(modules = graph.len(), externals = graph.externals().len(), "discovery finished");
        Ok(graph)
    }

    fn load(&self, path: &Path, is_entry: bool, via: DependencyKind) -> Result<Frame> {
        let root = self.config.root();
        let id = ModuleId::from_path(root, path)?;
        let rule = self.rules.classify(id.as_str())?;
        let content = self.config.runtime().read_file(path)?;

        let scanned = self.scanner.scan(id.as_str(), path, rule.kind, &content)?;
        let mut dependencies = Vec::with_capacity(scanned.len());
        let mut children = Vec::new();
        for dep in scanned {
            match self.resolver.resolve(&dep.specifier, path, rule.kind)? {
                None => {}
                Some(Resolution::External(name)) => {
                    dependencies.push(Dependency::external(dep.specifier, dep.kind, name));
                }
                Some(Resolution::Module(target)) => {
                    let target_id = ModuleId::from_path(root, &target)?;
                    dependencies.push(Dependency::module(dep.specifier, dep.kind, target_id));
                    children.push((target, dep.kind));
                }
            }
        }

        debug!(module = %id, rule = %rule.name, dependencies = dependencies.len(), "discovered");
        let module = Module::builder(id, path.to_path_buf(), rule.kind)
            .rule(rule.name.clone())
            .content(content)
            .dependencies(dependencies)
            .entry(is_entry)
            .build();

        Ok(Frame {
            module,
            via,
            children,
            next: 0,
        })
    }
}

/// The cycle closed by a `kind` edge to the gray module `target`, if every
/// edge on the walk path from `target` is static.
fn static_cycle(stack: &[Frame], target: &Path, kind: DependencyKind) -> Option<DependencyChain> {
    if !kind.is_static() {
        return None;
    }
    let start = stack.iter().position(|frame| frame.module.path == target)?;
    if !stack[start + 1..].iter().all(|frame| frame.via.is_static()) {
        return None;
    }
    let mut path: Vec<ModuleId> = stack[start..].iter().map(|f| f.module.id.clone()).collect();
    path.push(stack[start].module.id.clone());
    Some(DependencyChain::new(path))
}
