//! Property-based tests for resolution over random graphs.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::{ArtifactEntry, ArtifactGraph, Resolver, TestRuntime};

/// Random graph over `m0..m{n}`: each module gets edges to arbitrary other
/// modules (self edges and cycles included), some of them deferred.
fn graph_strategy() -> impl Strategy<Value = ArtifactGraph> {
    (1usize..=12).prop_flat_map(|size| {
        prop::collection::vec(
            (
                prop::collection::vec((0..size, prop::bool::ANY), 0..=4),
                prop::bool::ANY,
            ),
            size,
        )
        .prop_map(|modules| {
            let mut graph = ArtifactGraph::new();
            for (index, (edges, has_css)) in modules.into_iter().enumerate() {
                let mut entry = ArtifactEntry::new(format!("chunks/m{index}.js"));
                for (target, deferred) in edges {
                    let target = format!("m{target}");
                    entry = if deferred {
                        entry.with_deferred_import(target)
                    } else {
                        entry.with_import(target)
                    };
                }
                if has_css {
                    entry = entry.with_css(format!("m{index}.css"));
                }
                graph.insert(format!("m{index}"), entry);
            }
            graph
        })
    })
}

/// Modules reachable from `start` over static edges, by plain BFS.
fn reachable(graph: &ArtifactGraph, start: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut queue = vec![start.to_string()];
    while let Some(key) = queue.pop() {
        if !seen.insert(key.clone()) {
            continue;
        }
        if let Some(entry) = graph.get(&key) {
            queue.extend(entry.static_imports().map(|edge| edge.target.clone()));
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Resolution always terminates and touches exactly the statically
    /// reachable modules.
    #[test]
    fn prop_resolution_matches_reachability(graph in graph_strategy()) {
        let resolver = Resolver::new(&graph, Arc::new(TestRuntime::new("/app")), "/app");

        for key in graph.keys() {
            let resolved = resolver.resolve(key).unwrap();
            let expected = reachable(&graph, key);

            let mut chunks: HashSet<String> = resolved.imported_chunks.iter().cloned().collect();
            chunks.insert(resolved.file.clone());
            let expected_chunks: HashSet<String> = expected
                .iter()
                .map(|module| format!("chunks/{module}.js"))
                .collect();
            prop_assert_eq!(chunks, expected_chunks);

            let expected_css: HashSet<String> = expected
                .iter()
                .filter(|module| graph.get(module).is_some_and(|entry| !entry.css.is_empty()))
                .map(|module| format!("{module}.css"))
                .collect();
            let css: HashSet<String> = resolved.stylesheets.iter().cloned().collect();
            prop_assert_eq!(css, expected_css);
        }
    }

    /// Resolving the same entry twice gives byte-identical ordering.
    #[test]
    fn prop_resolution_is_deterministic(graph in graph_strategy()) {
        let resolver = Resolver::new(&graph, Arc::new(TestRuntime::new("/app")), "/app");

        for key in graph.keys() {
            let first = resolver.resolve(key).unwrap();
            let second = resolver.resolve(key).unwrap();
            prop_assert_eq!(
                first.imported_chunks.iter().collect::<Vec<_>>(),
                second.imported_chunks.iter().collect::<Vec<_>>()
            );
            prop_assert_eq!(
                first.stylesheets.iter().collect::<Vec<_>>(),
                second.stylesheets.iter().collect::<Vec<_>>()
            );
        }
    }

    /// The entry's own chunk never appears among its imports.
    #[test]
    fn prop_entry_not_in_imported_chunks(graph in graph_strategy()) {
        let resolver = Resolver::new(&graph, Arc::new(TestRuntime::new("/app")), "/app");

        for key in graph.keys() {
            let resolved = resolver.resolve(key).unwrap();
            prop_assert!(!resolved.imported_chunks.contains(&resolved.file));
        }
    }
}
