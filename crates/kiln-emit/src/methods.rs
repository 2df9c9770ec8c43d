//! HTTP methods declared by route handler modules.
//!
//! A handler module declares the methods it serves by exporting functions
//! named after them (`export function GET() {}`). The compiler reports each
//! module's export names; this module keeps the ones that are HTTP methods.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kiln_graph::{Route, Runtime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// The method an export name declares, if any. Matching is exact:
    /// `get` and `Get` are ordinary exports.
    pub fn from_export_name(name: &str) -> Option<Self> {
        match name {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output chunk as reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledChunk {
    /// Absolute path of the source module the chunk was built from.
    #[serde(default)]
    pub facade_module_id: Option<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportsInput {
    Table(IndexMap<String, Vec<String>>),
    Chunks(Vec<CompiledChunk>),
}

/// Source file -> export names, in compiler order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompiledExports {
    files: IndexMap<String, Vec<String>>,
}

impl CompiledExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<I, S>(mut self, file: impl Into<String>, exports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files
            .insert(file.into(), exports.into_iter().map(Into::into).collect());
        self
    }

    /// Parse either a `{ file: [exports] }` table or the compiler's chunk
    /// list; chunk facades are made relative to `cwd`.
    pub fn from_json(source: &str, runtime: &dyn Runtime, cwd: &Path) -> Result<Self> {
        match serde_json::from_str(source).map_err(Error::InvalidExports)? {
            ExportsInput::Table(files) => Ok(Self { files }),
            ExportsInput::Chunks(chunks) => Ok(Self::from_chunks(runtime, cwd, &chunks)),
        }
    }

    /// Build the table from compiler output chunks. Chunks without a facade
    /// module (shared chunks) declare nothing and are skipped.
    ///
    /// Facades are physical paths, so they are matched against both `cwd`
    /// and its physical location.
    pub fn from_chunks(runtime: &dyn Runtime, cwd: &Path, chunks: &[CompiledChunk]) -> Self {
        let mut roots = vec![cwd.to_path_buf()];
        match runtime.canonicalize(cwd) {
            Ok(real) if real != cwd => roots.push(real),
            Ok(_) => {}
            Err(err) => debug!(cwd = %cwd.display(), %err, "project root has no physical path"),
        }

        let mut files = IndexMap::new();
        for chunk in chunks {
            let Some(facade) = chunk.facade_module_id.as_deref() else {
                continue;
            };
            files.insert(relative_posix(&roots, facade), chunk.exports.clone());
        }
        Self { files }
    }

    pub fn get(&self, file: &str) -> Option<&[String]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn relative_posix(roots: &[PathBuf], facade: &str) -> String {
    let Some(relative) = roots
        .iter()
        .find_map(|root| Path::new(facade).strip_prefix(root).ok())
    else {
        return facade.replace('\\', "/");
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Handler file -> methods it exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodTable {
    files: IndexMap<String, Vec<HttpMethod>>,
}

impl MethodTable {
    pub fn get(&self, file: &str) -> Option<&[HttpMethod]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HttpMethod])> {
        self.files
            .iter()
            .map(|(file, methods)| (file.as_str(), methods.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Collect the HTTP methods of every route's endpoint and server-logic files.
///
/// Files the compiler reported no exports for are left out of the table.
pub fn extract_methods(routes: &[Route], exports: &CompiledExports) -> MethodTable {
    let mut files: IndexMap<String, Vec<HttpMethod>> = IndexMap::new();

    for route in routes {
        for file in route.handler_files() {
            if files.contains_key(file) {
                continue;
            }
            let Some(names) = exports.get(file) else {
                debug!(route = %route.id, file, "no exports recorded for handler");
                continue;
            };
            let methods: Vec<HttpMethod> = names
                .iter()
                .filter_map(|name| HttpMethod::from_export_name(name))
                .collect();
            files.insert(file.to_string(), methods);
        }
    }

    MethodTable { files }
}
