//! Transitive asset resolution.
//!
//! Resolving an entry walks its static imports depth-first and collects,
//! in traversal order, every compiled chunk, stylesheet and asset the entry
//! needs before it can run. Deferred (`import()`) edges are not followed:
//! whatever sits behind them is fetched on demand and must not end up in the
//! entry's upfront manifest.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::graph::ArtifactGraph;
use crate::identity::{CanonicalModule, IdentityReconciler};
use crate::runtime::Runtime;

const FONT_EXTENSIONS: [&str; 4] = [".woff", ".woff2", ".ttf", ".otf"];

/// Whether an emitted asset is a font file.
pub fn is_font(asset: &str) -> bool {
    let lower = asset.to_ascii_lowercase();
    FONT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Everything one entry module pulls in through static imports.
///
/// Sets preserve insertion order, which is traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntry {
    /// Compiled file of the entry itself.
    pub file: String,
    /// Compiled files of every other reached module.
    pub imported_chunks: IndexSet<String>,
    pub stylesheets: IndexSet<String>,
    pub fonts: IndexSet<String>,
    /// Every non-stylesheet asset reached, fonts included.
    pub assets: IndexSet<String>,
}

/// Resolves entry modules against an artifact graph.
///
/// Each call to [`Resolver::resolve`] starts from an empty visited set, so
/// modules shared between entries contribute to every entry that reaches
/// them.
#[derive(Debug)]
pub struct Resolver<'g> {
    identity: IdentityReconciler<'g>,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g ArtifactGraph, runtime: Arc<dyn Runtime>, root: impl Into<PathBuf>) -> Self {
        Self::with_identity(IdentityReconciler::new(graph, runtime, root))
    }

    pub fn with_identity(identity: IdentityReconciler<'g>) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &IdentityReconciler<'g> {
        &self.identity
    }

    pub fn graph(&self) -> &'g ArtifactGraph {
        self.identity.graph()
    }

    /// Collect the transitive static dependencies of `entry`.
    ///
    /// # Errors
    ///
    /// Fails on the first module (the entry or any static import reached
    /// from it) that cannot be found in the graph or whose path cannot be
    /// resolved on disk.
    pub fn resolve(&self, entry: &str) -> Result<ResolvedEntry> {
        let root = self.identity.canonicalize(entry)?;
        let mut resolved = ResolvedEntry {
            file: root.entry.compiled_file.clone(),
            ..ResolvedEntry::default()
        };

        let mut visited = FxHashSet::default();
        let mut stack: Vec<CanonicalModule<'g>> = vec![root];

        while let Some(module) = stack.pop() {
            if !visited.insert(module.index) {
                continue;
            }
            debug!(module = module.key, file = %module.entry.compiled_file, "visiting module");

            if module.entry.compiled_file != resolved.file {
                resolved
                    .imported_chunks
                    .insert(module.entry.compiled_file.clone());
            }
            resolved.stylesheets.extend(module.entry.css.iter().cloned());
            for asset in &module.entry.assets {
                if is_font(asset) {
                    resolved.fonts.insert(asset.clone());
                }
                resolved.assets.insert(asset.clone());
            }

            // Reverse so the first import is popped first, matching a
            // recursive preorder walk.
            for edge in module.entry.static_imports().rev() {
                let next = self.identity.canonicalize(&edge.target)?;
                if !visited.contains(&next.index) {
                    stack.push(next);
                }
            }
        }

        debug!(
            entry,
            chunks = resolved.imported_chunks.len(),
            stylesheets = resolved.stylesheets.len(),
            fonts = resolved.fonts.len(),
            "resolved entry"
        );

        Ok(resolved)
    }
}
