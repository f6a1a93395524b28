use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{AssetKind, ModuleId};

/// How a dependency was referenced from its importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// `import x from '...'`, `require('...')`, `@import '...'`
    Import,
    /// `import('...')`; starts a new async chunk
    Dynamic,
    /// `url(...)` inside a stylesheet
    Url,
}

impl DependencyKind {
    pub fn is_static(self) -> bool {
        !matches!(self, DependencyKind::Dynamic)
    }
}

/// Where a dependency points after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyTarget {
    Module(ModuleId),
    /// Bare import that is not bundled (provided at runtime).
    External(String),
}

/// A resolved edge from one module to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Specifier exactly as written in the importer.
    pub specifier: String,
    pub kind: DependencyKind,
    pub target: DependencyTarget,
}

impl Dependency {
    pub fn module(specifier: impl Into<String>, kind: DependencyKind, id: ModuleId) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
            target: DependencyTarget::Module(id),
        }
    }

    pub fn external(specifier: impl Into<String>, kind: DependencyKind, name: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
            target: DependencyTarget::External(name.into()),
        }
    }

    /// Target module id, `None` for externals.
    pub fn target_module(&self) -> Option<&ModuleId> {
        match &self.target {
            DependencyTarget::Module(id) => Some(id),
            DependencyTarget::External(_) => None,
        }
    }
}

/// A discovered source unit.
///
/// Modules are immutable once they enter the graph. Raw content is shared
/// behind an `Arc` so cloning a module never copies file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub path: PathBuf,
    pub kind: AssetKind,
    /// Name of the classifier rule that matched this module.
    pub rule: String,
    content: Arc<[u8]>,
    pub dependencies: Vec<Dependency>,
    pub is_entry: bool,
}

impl Module {
    /// Create a new module builder with sensible defaults.
    pub fn builder(id: ModuleId, path: PathBuf, kind: AssetKind) -> ModuleBuilder {
        ModuleBuilder {
            module: Self {
                id,
                path,
                kind,
                rule: String::new(),
                content: Arc::from(Vec::new()),
                dependencies: Vec::new(),
                is_entry: false,
            },
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids of bundled dependencies in declaration order, without duplicates.
    pub fn dependency_ids(&self) -> impl Iterator<Item = (&ModuleId, DependencyKind)> {
        let mut seen = Vec::<&ModuleId>::new();
        self.dependencies.iter().filter_map(move |dep| {
            let id = dep.target_module()?;
            if seen.contains(&id) {
                return None;
            }
            seen.push(id);
            Some((id, dep.kind))
        })
    }
}

/// Builder for [`Module`].
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn content(mut self, content: impl Into<Arc<[u8]>>) -> Self {
        self.module.content = content.into();
        self
    }

    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.module.rule = rule.into();
        self
    }

    pub fn dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.module.dependencies = dependencies;
        self
    }

    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.module.dependencies.push(dependency);
        self
    }

    pub fn entry(mut self, is_entry: bool) -> Self {
        self.module.is_entry = is_entry;
        self
    }

    pub fn build(self) -> Module {
        self.module
    }
}
