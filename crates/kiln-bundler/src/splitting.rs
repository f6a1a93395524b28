//! Chunk splitting.
//!
//! Policy `all`:
//!
//! ```text
//! main.js ──▶ a.js ──▶ node_modules/x ─┐      vendors  (initial)
//!    │                                  ├────▶ main     (initial)
//!    └╌╌ import() ╌╌▶ page.js ──▶ b.js ─┘      page     (async)
//!                                              shared   (in ≥ min_chunks async groups)
//! ```
//!
//! Every group becomes up to two chunks, one per format, so stylesheets are
//! extracted next to the scripts that import them. Images and fonts are
//! never chunked. Policy `single` puts every reachable module in `main`.
//!
//! Group membership is computed from depth-first post-orders over the
//! module graph, so identical graphs always produce identical chunks.

use indexmap::IndexMap;
use kiln_config::{SplitOptions, SplitPolicy};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Chunk, ChunkFormat, ChunkKind, DependencyKind, ModuleGraph, ModuleId};

pub const ENTRY_CHUNK: &str = "main";
pub const VENDOR_CHUNK: &str = "vendors";
pub const SHARED_CHUNK: &str = "shared";

/// A named set of modules before it is split by format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkGroup {
    pub name: String,
    pub kind: ChunkKind,
    /// Dependencies first.
    pub modules: Vec<ModuleId>,
}

impl ChunkGroup {
    fn new(name: impl Into<String>, kind: ChunkKind, modules: Vec<ModuleId>) -> Self {
        Self {
            name: name.into(),
            kind,
            modules,
        }
    }
}

fn is_static(dep: &crate::Dependency) -> bool {
    dep.kind.is_static()
}

/// Group the modules of `graph` according to `options`.
pub fn plan_groups(graph: &ModuleGraph, options: &SplitOptions) -> Vec<ChunkGroup> {
    let Some(entry) = graph.entry() else {
        return Vec::new();
    };
    match options.policy {
        SplitPolicy::Single => vec![ChunkGroup::new(
            ENTRY_CHUNK,
            ChunkKind::Entry,
            graph.post_order(&[entry], |_| true),
        )],
        SplitPolicy::All => plan_all(graph, entry, options),
    }
}

fn plan_all(graph: &ModuleGraph, entry: &ModuleId, options: &SplitOptions) -> Vec<ChunkGroup> {
    let initial = graph.post_order(&[entry], is_static);
    let initial_set: FxHashSet<&ModuleId> = initial.iter().collect();

    // Dynamic import targets in walk order.
    let mut targets: Vec<&ModuleId> = Vec::new();
    for id in graph.post_order(&[entry], |_| true) {
        let Some(module) = graph.get(&id) else { continue };
        for dep in &module.dependencies {
            if dep.kind != DependencyKind::Dynamic {
                continue;
            }
            if let Some(target) = dep.target_module() {
                if !initial_set.contains(target) && !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
    }

    let mut names = NameAllocator::default();
    let async_groups: Vec<(String, Vec<ModuleId>)> = targets
        .iter()
        .map(|target| {
            let members = graph
                .post_order(&[*target], is_static)
                .into_iter()
                .filter(|id| !initial_set.contains(id))
                .collect();
            (names.allocate(target.file_stem()), members)
        })
        .collect();

    // How many async groups each module appears in.
    let mut occurrences: IndexMap<&ModuleId, usize> = IndexMap::new();
    for (_, members) in &async_groups {
        for id in members {
            *occurrences.entry(id).or_default() += 1;
        }
    }
    // A module in one async group is never shared.
    let min_chunks = options.min_chunks.max(2);
    let shared: Vec<ModuleId> = occurrences
        .iter()
        .filter(|(_, count)| **count >= min_chunks)
        .map(|(id, _)| (*id).clone())
        .collect();
    let shared_set: FxHashSet<&ModuleId> = shared.iter().collect();

    let (vendors, main): (Vec<ModuleId>, Vec<ModuleId>) = initial
        .iter()
        .cloned()
        .partition(|id| {
            !options.vendor_pattern.is_empty() && id.as_str().contains(&options.vendor_pattern)
        });

    let mut groups = vec![
        ChunkGroup::new(VENDOR_CHUNK, ChunkKind::Vendor, vendors),
        ChunkGroup::new(ENTRY_CHUNK, ChunkKind::Entry, main),
    ];

    // Modules in several async groups but below the threshold stay in the first.
    let mut placed: FxHashSet<ModuleId> = FxHashSet::default();
    for (name, members) in async_groups {
        let members = members
            .into_iter()
            .filter(|id| !shared_set.contains(id) && placed.insert(id.clone()))
            .collect();
        groups.push(ChunkGroup::new(name, ChunkKind::Async, members));
    }
    groups.push(ChunkGroup::new(SHARED_CHUNK, ChunkKind::Shared, shared));

    groups.retain(|group| !group.modules.is_empty());
    groups
}

/// Unique chunk names derived from file stems.
#[derive(Default)]
struct NameAllocator {
    used: FxHashMap<String, usize>,
}

impl NameAllocator {
    fn allocate(&mut self, stem: &str) -> String {
        let base = match stem {
            ENTRY_CHUNK | VENDOR_CHUNK | SHARED_CHUNK | "" => format!("{}-async", stem),
            other => other.to_string(),
        };
        let count = self.used.entry(base.clone()).or_default();
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, count)
        }
    }
}

/// Split groups into script and style chunks without code.
pub fn chunks_from_groups(graph: &ModuleGraph, groups: &[ChunkGroup]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for group in groups {
        for format in [ChunkFormat::Script, ChunkFormat::Style] {
            let members: Vec<ModuleId> = group
                .modules
                .iter()
                .filter(|id| {
                    graph
                        .get(id)
                        .is_some_and(|module| module.kind.chunk_format() == Some(format))
                })
                .cloned()
                .collect();
            if !members.is_empty() {
                chunks.push(Chunk::new(group.name.clone(), group.kind, format, members));
            }
        }
    }
    chunks
}

/// Plan groups and split them by format.
pub fn split(graph: &ModuleGraph, options: &SplitOptions) -> Vec<Chunk> {
    chunks_from_groups(graph, &plan_groups(graph, options))
}
