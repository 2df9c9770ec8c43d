#![cfg_attr(docsrs, feature(doc_cfg))]
//! # kiln-emit
//!
//! Generates the server half of a kiln build from the compiler's artifact
//! graph and the app's route manifest.
//!
//! ## Output
//!
//! Everything lands under `{out_dir}/server/`:
//!
//! ```text
//! index.js            server entry: paths, options, templates, hooks
//! nodes/{i}.js        one module per route node
//! stylesheets/{n}.js  inlined stylesheets, one per slot
//! matchers.js         param matcher loader
//! methods.json        handler file -> HTTP methods
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use kiln_config::ConfigLoader;
//! use kiln_emit::{BuildInputs, ServerBuild};
//! use kiln_graph::NativeRuntime;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cwd = std::env::current_dir()?;
//! let config = ConfigLoader::new(&cwd).load()?;
//! let inputs = BuildInputs::from_files(
//!     &cwd,
//!     "manifest.json".as_ref(),
//!     "routes.json".as_ref(),
//!     "exports.json".as_ref(),
//! )?;
//!
//! let report = ServerBuild::new(&config, Arc::new(NativeRuntime), &cwd).run(&inputs)?;
//! println!("wrote {} node modules", report.nodes.len());
//! # Ok(()) }
//! ```

pub mod build;
pub mod inline;
mod js;
pub mod matchers;
pub mod methods;
pub mod node;
pub mod output;
pub mod server_entry;
pub mod template;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

use std::path::PathBuf;

pub use build::{BuildInputs, BuildReport, ServerBuild};
pub use inline::{InlineTable, StylesheetInliner, StylesheetModule};
pub use matchers::emit_matchers;
pub use methods::{CompiledChunk, CompiledExports, HttpMethod, MethodTable, extract_methods};
pub use node::{InlineStyle, LoaderRef, NodeEmitter, NodeManifestRecord};
pub use output::OutputWriter;
pub use server_entry::{Templates, emit_server_entry};
pub use template::{Template, TemplateError, TemplateKind, TemplateToken};

use kiln_graph::{GraphError, RuntimeError};

/// Error types for kiln-emit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Graph lookup or traversal failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A stylesheet selected for inlining could not be read.
    #[error("Failed to read stylesheet \"{path}\": {source}")]
    AssetReadFailure {
        path: String,
        #[source]
        source: RuntimeError,
    },

    /// A template file could not be read.
    #[error("Template not found: {}", path.display())]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// A template has bad or missing placeholders.
    #[error("Invalid template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    /// The compiled-exports input could not be parsed.
    #[error("Invalid compiled exports: {0}")]
    InvalidExports(#[source] serde_json::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// An input file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for kiln-emit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Graph(GraphError::MissingManifestEntry { .. }) => "MISSING_MANIFEST_ENTRY",
            Error::Graph(GraphError::UnresolvableSymlink { .. }) => "UNRESOLVABLE_SYMLINK",
            Error::Graph(GraphError::InvalidGraph(_)) => "INVALID_GRAPH",
            Error::Graph(GraphError::InvalidRouteManifest(_)) => "INVALID_ROUTE_MANIFEST",
            Error::AssetReadFailure { .. } => "ASSET_READ_FAILURE",
            Error::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Error::Template { .. } => "TEMPLATE_ERROR",
            Error::InvalidExports(_) => "INVALID_EXPORTS",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure { .. } => "WRITE_FAILURE",
            Error::Read { .. } => "READ_FAILURE",
            Error::Serialize(_) => "SERIALIZE_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Graph(GraphError::MissingManifestEntry { path }) => Some(Box::new(format!(
                "'{}' is imported or referenced by a route but the compiler did not record it.\nRebuild the client and server bundles so the artifact graph is current.",
                path
            ))),
            Error::Graph(GraphError::UnresolvableSymlink { attempted, .. }) => {
                Some(Box::new(format!(
                    "Could not resolve '{}' on disk. Check for broken or circular symlinks.",
                    attempted.display()
                )))
            }
            Error::AssetReadFailure { path, .. } => Some(Box::new(format!(
                "Stylesheet '{}' is below the inline threshold but could not be read from the client output.\nCheck that the client build finished and `client_dir` points at it.",
                path
            ))),
            Error::TemplateNotFound { path, .. } => Some(Box::new(format!(
                "Create '{}' or point `files.app_template` at your HTML shell.",
                path.display()
            ))),
            Error::Template { source, .. } => source.help().map(|h| Box::new(h) as Box<dyn std::fmt::Display>),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the output directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure { .. } => Some(Box::new(
                "Failed to write file. Check disk space and permissions.",
            )),
            _ => None,
        }
    }
}
