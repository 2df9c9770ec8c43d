//! Module identity across filesystem symlinks.
//!
//! The compiler records a module under whatever path it reached it by, so a
//! workspace package can show up as `packages/ui/Button.svelte` in one place
//! and `node_modules/ui/Button.svelte` in another. Before any lookup, the
//! reconciler maps a logical path to its physical file and then to the graph
//! entry recorded for that physical file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::graph::{ArtifactEntry, ArtifactGraph, DanglingReference};
use crate::runtime::Runtime;
use crate::{GraphError, Result};

/// A graph entry reached through the reconciler.
///
/// `index` is the entry's position in the graph and is the identity used for
/// visited-set bookkeeping: two spellings of one physical file share it.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalModule<'g> {
    pub index: usize,
    pub key: &'g str,
    pub entry: &'g ArtifactEntry,
}

/// Maps logical module paths to the single graph entry for their physical file.
#[derive(Debug)]
pub struct IdentityReconciler<'g> {
    graph: &'g ArtifactGraph,
    runtime: Arc<dyn Runtime>,
    root: PathBuf,
    /// Physical path -> position of the first graph key that resolves to it.
    physical: FxHashMap<PathBuf, usize>,
}

impl<'g> IdentityReconciler<'g> {
    /// Index every graph key by its physical location under `root`.
    ///
    /// Keys that do not exist on disk (virtual modules, deleted sources) are
    /// left out of the index and can only be found by exact key.
    pub fn new(graph: &'g ArtifactGraph, runtime: Arc<dyn Runtime>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut physical = FxHashMap::default();

        for (index, key) in graph.keys().enumerate() {
            match runtime.canonicalize(&root.join(key)) {
                Ok(real) => {
                    physical.entry(real).or_insert(index);
                }
                Err(err) => trace!(key, %err, "graph key has no physical file"),
            }
        }

        debug!(
            entries = graph.len(),
            physical = physical.len(),
            "indexed artifact graph identities"
        );

        Self {
            graph,
            runtime,
            root,
            physical,
        }
    }

    pub fn graph(&self) -> &'g ArtifactGraph {
        self.graph
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` to the graph entry that owns its physical file.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnresolvableSymlink`] when the filesystem refuses to
    ///   resolve the path for any reason other than it not existing.
    /// - [`GraphError::MissingManifestEntry`] when neither the physical file
    ///   nor the literal path is a graph key.
    pub fn canonicalize(&self, path: &str) -> Result<CanonicalModule<'g>> {
        let candidate = self.root.join(path);

        match self.runtime.canonicalize(&candidate) {
            Ok(real) => {
                if let Some(&index) = self.physical.get(&real) {
                    return self.at(index, path);
                }
                self.exact(path)
            }
            Err(err) if err.is_not_found() => self.exact(path),
            Err(source) => Err(GraphError::UnresolvableSymlink {
                path: path.to_string(),
                attempted: candidate,
                source,
            }),
        }
    }

    /// Edges whose target has no graph entry under any spelling.
    ///
    /// These are harmless as long as no resolution reaches them; the build
    /// reports them as warnings and only fails when a traversal hits one.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.graph
            .iter()
            .flat_map(move |(importer, entry)| {
                entry
                    .imports
                    .iter()
                    .filter(move |edge| {
                        matches!(
                            self.canonicalize(&edge.target),
                            Err(GraphError::MissingManifestEntry { .. })
                        )
                    })
                    .map(move |edge| DanglingReference {
                        importer: importer.to_string(),
                        target: edge.target.clone(),
                        kind: edge.kind,
                    })
            })
            .collect()
    }

    fn exact(&self, path: &str) -> Result<CanonicalModule<'g>> {
        self.graph
            .get_full(path)
            .map(|(index, key, entry)| CanonicalModule { index, key, entry })
            .ok_or_else(|| GraphError::MissingManifestEntry {
                path: path.to_string(),
            })
    }

    fn at(&self, index: usize, path: &str) -> Result<CanonicalModule<'g>> {
        let (key, entry) =
            self.graph
                .get_index(index)
                .ok_or_else(|| GraphError::MissingManifestEntry {
                    path: path.to_string(),
                })?;
        if key != path {
            trace!(path, key, "reconciled aliased module path");
        }
        Ok(CanonicalModule { index, key, entry })
    }
}
