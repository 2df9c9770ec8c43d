//! # kiln-graph
//!
//! Artifact graph model and transitive asset resolution for the kiln server
//! build.
//!
//! The compiler hands the build a manifest mapping each source module to the
//! file it was compiled into, its import edges and its emitted assets. This
//! crate answers one question about that manifest: given an entry module,
//! which compiled chunks, stylesheets, fonts and assets does it need before
//! it can render?
//!
//! ## Overview
//!
//! - [`ArtifactGraph`]: the compiler manifest, in compiler order.
//! - [`IdentityReconciler`]: collapses symlinked spellings of one physical
//!   file onto a single graph entry.
//! - [`Resolver`]: depth-first walk over static edges producing a
//!   [`ResolvedEntry`].
//! - [`RouteManifest`]: the route tree's nodes, endpoints and param matchers.
//! - [`Runtime`]: filesystem access, native or in-memory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kiln_graph::{ArtifactGraph, NativeRuntime, Resolver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = ArtifactGraph::from_json(&std::fs::read_to_string("manifest.json")?)?;
//! let resolver = Resolver::new(&graph, Arc::new(NativeRuntime), std::env::current_dir()?);
//!
//! let page = resolver.resolve("src/routes/+page.svelte")?;
//! println!("{} needs {:?}", page.file, page.imported_chunks);
//! # Ok(())
//! # }
//! ```

pub mod graph;
pub mod identity;
pub mod resolve;
pub mod route;
pub mod runtime;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

pub use graph::{ArtifactEntry, ArtifactGraph, DanglingReference, EdgeKind, ImportEdge};
pub use identity::{CanonicalModule, IdentityReconciler};
pub use resolve::{ResolvedEntry, Resolver, is_font};
pub use route::{NodeRole, Route, RouteManifest, RouteNode};
pub use runtime::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

#[cfg(not(target_family = "wasm"))]
pub use runtime::native::NativeRuntime;

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils::TestRuntime;

/// Result alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while reading or walking the artifact graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A module reached during resolution has no graph entry.
    #[error("Could not find \"{path}\" in the artifact graph")]
    MissingManifestEntry { path: String },

    /// The filesystem could not resolve a module path for a reason other
    /// than the path not existing (permissions, symlink loops).
    #[error("Failed to resolve \"{path}\" via {}", attempted.display())]
    UnresolvableSymlink {
        path: String,
        attempted: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("Invalid artifact graph: {0}")]
    InvalidGraph(#[source] serde_json::Error),

    #[error("Invalid route manifest: {0}")]
    InvalidRouteManifest(#[source] serde_json::Error),
}

impl GraphError {
    /// Module path the error is about, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            GraphError::MissingManifestEntry { path }
            | GraphError::UnresolvableSymlink { path, .. } => Some(path),
            GraphError::InvalidGraph(_) | GraphError::InvalidRouteManifest(_) => None,
        }
    }
}
