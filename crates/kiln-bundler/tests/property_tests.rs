//! Property tests over generated projects held in memory.
//!
//! Module `i` may only import modules with a larger index, so generated
//! graphs are acyclic unless a back edge is added on purpose.

use std::sync::Arc;

use kiln_bundler::discovery::Discovery;
use kiln_bundler::scanner::Scanner;
use kiln_bundler::splitting::split;
use kiln_bundler::{
    BuildConfig, BuildGraph, Chunk, Error, FsResolver, MemoryRuntime, ModuleGraph, RuleTable,
};
use kiln_config::{BuildOptions, Environment};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Edge {
    from: usize,
    to: usize,
    dynamic: bool,
}

fn project_strategy() -> impl Strategy<Value = (usize, Vec<Edge>)> {
    (2usize..=12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n, any::<bool>()), 0..=n * 2).prop_map(|raw| {
            raw.into_iter()
                .filter(|(a, b, _)| a != b)
                .map(|(a, b, dynamic)| Edge {
                    from: a.min(b),
                    to: a.max(b),
                    dynamic,
                })
                .collect::<Vec<_>>()
        });
        (Just(n), edges)
    })
}

fn runtime(n: usize, edges: &[Edge]) -> MemoryRuntime {
    let runtime = MemoryRuntime::new();
    for index in 0..n {
        let mut source = String::new();
        for edge in edges.iter().filter(|e| e.from == index) {
            if edge.dynamic {
                source.push_str(&format!("import('./m{}.js');\n", edge.to));
            } else {
                source.push_str(&format!("import './m{}.js';\n", edge.to));
            }
        }
        source.push_str(&format!("export const m{} = {};\n", index, index));
        runtime.insert(format!("/app/src/m{}.js", index), source);
    }
    runtime
}

fn config(runtime: MemoryRuntime) -> BuildConfig {
    let options = BuildOptions {
        entry: "src/m0.js".into(),
        ..BuildOptions::default()
    };
    BuildConfig::new("/app", Environment::Development, options).with_runtime(Arc::new(runtime))
}

fn discover(config: &BuildConfig) -> kiln_bundler::Result<ModuleGraph> {
    let rules = RuleTable::new(&config.options().rules)?;
    let scanner = Scanner::new()?;
    let resolver = FsResolver::from_config(config);
    Discovery::new(config, &rules, &scanner, &resolver).run()
}

fn reachable(n: usize, edges: &[Edge]) -> usize {
    let mut seen = vec![false; n];
    let mut stack = vec![0];
    seen[0] = true;
    while let Some(node) = stack.pop() {
        for edge in edges.iter().filter(|e| e.from == node) {
            if !seen[edge.to] {
                seen[edge.to] = true;
                stack.push(edge.to);
            }
        }
    }
    seen.into_iter().filter(|s| *s).count()
}

fn membership(chunks: &[Chunk]) -> Vec<(String, Vec<String>)> {
    chunks
        .iter()
        .map(|c| {
            (
                c.source_name(),
                c.modules().iter().map(|m| m.to_string()).collect(),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Discovery terminates and every reachable module is visited exactly once.
    #[test]
    fn discovery_visits_each_module_once((n, edges) in project_strategy()) {
        let config = config(runtime(n, &edges));
        let graph = discover(&config).unwrap();
        prop_assert_eq!(graph.len(), reachable(n, &edges));
    }

    /// Identical input yields identical chunks, and each module sits in one chunk.
    #[test]
    fn chunking_is_deterministic((n, edges) in project_strategy()) {
        let config = config(runtime(n, &edges));
        let first = discover(&config).unwrap();
        let second = discover(&config).unwrap();

        let split_options = &config.options().split;
        let a = split(&first, split_options);
        let b = split(&second, split_options);
        prop_assert_eq!(membership(&a), membership(&b));

        let graph = BuildGraph::new(first.clone(), a, Vec::new()).unwrap();
        prop_assert_eq!(graph.chunked_module_count(), first.len());
    }

    /// Closing a static chain into a loop is always reported as a cycle.
    #[test]
    fn static_back_edge_is_a_cycle(len in 2usize..8, back in 0usize..8) {
        let back = back % len;
        let chain: Vec<Edge> = (0..len)
            .map(|i| Edge { from: i, to: i + 1, dynamic: false })
            .collect();
        let runtime = runtime(len + 1, &chain);
        // the last module imports an earlier one
        runtime.insert(
            format!("/app/src/m{}.js", len),
            format!("import './m{}.js';\n", back),
        );

        let err = discover(&config(runtime)).unwrap_err();
        prop_assert!(matches!(err, Error::CyclicDependency { .. }), "got {}", err);
    }
}
