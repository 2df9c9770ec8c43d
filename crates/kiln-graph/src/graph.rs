//! The compiler's artifact graph.
//!
//! Keys are source module paths as the compiler recorded them (relative to
//! the project root, posix separators). Each entry names the compiled file
//! the module ended up in, its import edges, and the assets it pulled in.
//!
//! The on-disk format is the compiler manifest:
//!
//! ```json
//! {
//!   "src/routes/+page.svelte": {
//!     "file": "entries/pages/_page.svelte.js",
//!     "imports": ["src/lib/shared.js"],
//!     "dynamicImports": ["src/lib/heavy.js"],
//!     "css": ["assets/_page.css"],
//!     "assets": ["assets/inter.woff2"]
//!   }
//! }
//! ```
//!
//! `imports` become [`EdgeKind::Static`] edges and `dynamicImports` become
//! [`EdgeKind::Deferred`] edges, so traversal filters by tag instead of by
//! which list an edge came from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

/// How an import edge is loaded at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Linked eagerly; the target is needed before the importer runs.
    Static,
    /// `import()`; the target is fetched on demand.
    Deferred,
}

/// One import edge out of an artifact entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportEdge {
    /// Source path of the imported module (a graph key).
    pub target: String,
    pub kind: EdgeKind,
}

impl ImportEdge {
    pub fn new(target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }

    pub fn is_static(&self) -> bool {
        self.kind == EdgeKind::Static
    }
}

/// A compiled module as recorded by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct ArtifactEntry {
    /// Compiled output file, relative to the output directory.
    pub compiled_file: String,
    /// Import edges in the order the compiler listed them.
    pub imports: Vec<ImportEdge>,
    /// Stylesheets emitted for this module.
    pub css: Vec<String>,
    /// Other emitted assets (fonts, images).
    pub assets: Vec<String>,
    pub is_entry: bool,
    pub is_dynamic_entry: bool,
}

impl ArtifactEntry {
    pub fn new(compiled_file: impl Into<String>) -> Self {
        Self {
            compiled_file: compiled_file.into(),
            imports: Vec::new(),
            css: Vec::new(),
            assets: Vec::new(),
            is_entry: false,
            is_dynamic_entry: false,
        }
    }

    pub fn with_import(mut self, target: impl Into<String>) -> Self {
        self.imports.push(ImportEdge::new(target, EdgeKind::Static));
        self
    }

    pub fn with_deferred_import(mut self, target: impl Into<String>) -> Self {
        self.imports.push(ImportEdge::new(target, EdgeKind::Deferred));
        self
    }

    pub fn with_css(mut self, asset: impl Into<String>) -> Self {
        self.css.push(asset.into());
        self
    }

    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.assets.push(asset.into());
        self
    }

    pub fn entry(mut self, is_entry: bool) -> Self {
        self.is_entry = is_entry;
        self
    }

    pub fn dynamic_entry(mut self, is_dynamic_entry: bool) -> Self {
        self.is_dynamic_entry = is_dynamic_entry;
        self
    }

    /// Import edges that are linked eagerly.
    pub fn static_imports(&self) -> impl DoubleEndedIterator<Item = &ImportEdge> {
        self.imports.iter().filter(|edge| edge.is_static())
    }
}

/// Wire format of one compiler manifest entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dynamic_imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    css: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    assets: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_entry: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_dynamic_entry: bool,
}

impl From<RawEntry> for ArtifactEntry {
    fn from(raw: RawEntry) -> Self {
        let imports = raw
            .imports
            .into_iter()
            .map(|target| ImportEdge::new(target, EdgeKind::Static))
            .chain(
                raw.dynamic_imports
                    .into_iter()
                    .map(|target| ImportEdge::new(target, EdgeKind::Deferred)),
            )
            .collect();

        Self {
            compiled_file: raw.file,
            imports,
            css: raw.css,
            assets: raw.assets,
            is_entry: raw.is_entry,
            is_dynamic_entry: raw.is_dynamic_entry,
        }
    }
}

impl From<ArtifactEntry> for RawEntry {
    fn from(entry: ArtifactEntry) -> Self {
        let (imports, dynamic_imports): (Vec<_>, Vec<_>) =
            entry.imports.into_iter().partition(ImportEdge::is_static);

        Self {
            file: entry.compiled_file,
            imports: imports.into_iter().map(|edge| edge.target).collect(),
            dynamic_imports: dynamic_imports.into_iter().map(|edge| edge.target).collect(),
            css: entry.css,
            assets: entry.assets,
            is_entry: entry.is_entry,
            is_dynamic_entry: entry.is_dynamic_entry,
        }
    }
}

/// An import edge whose target has no entry in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub importer: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// Read-only map from source module path to its compiled artifact.
///
/// Key order is the compiler's order, which keeps every derived output
/// stable across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactGraph {
    entries: IndexMap<String, ArtifactEntry>,
}

impl ArtifactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a compiler manifest.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(GraphError::InvalidGraph)
    }

    /// Builder-style insert, mostly for tests and programmatic graphs.
    pub fn with_entry(mut self, key: impl Into<String>, entry: ArtifactEntry) -> Self {
        self.insert(key, entry);
        self
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, entry: ArtifactEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&ArtifactEntry> {
        self.entries.get(key)
    }

    /// Entry together with its position and stored key.
    pub fn get_full(&self, key: &str) -> Option<(usize, &str, &ArtifactEntry)> {
        self.entries
            .get_full(key)
            .map(|(index, key, entry)| (index, key.as_str(), entry))
    }

    /// Entry at a position previously returned by [`ArtifactGraph::get_full`].
    pub fn get_index(&self, index: usize) -> Option<(&str, &ArtifactEntry)> {
        self.entries
            .get_index(index)
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArtifactEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
