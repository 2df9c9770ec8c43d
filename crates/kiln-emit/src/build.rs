//! One server build pass.
//!
//! [`ServerBuild::run`] renders the server entry, resolves every route node
//! in manifest order (assigning inline slots as it goes), and renders the
//! matchers module and the method table. Output is written only after all
//! of that succeeded, with the node modules written in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::KilnConfig;
use kiln_graph::{ArtifactGraph, DanglingReference, IdentityReconciler, Resolver, RouteManifest, Runtime};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::inline::{InlineTable, StylesheetInliner};
use crate::matchers::{MATCHERS_MODULE, emit_matchers};
use crate::methods::{CompiledExports, MethodTable, extract_methods};
use crate::node::{NodeEmitter, NodeManifestRecord};
use crate::output::OutputWriter;
use crate::server_entry::{SERVER_ENTRY_MODULE, Templates, emit_server_entry};
use crate::{Error, Result};

/// Output path of the method table relative to the server output directory.
pub const METHODS_FILE: &str = "methods.json";

/// Compiler and router output a build consumes.
#[derive(Debug, Clone, Default)]
pub struct BuildInputs {
    pub graph: ArtifactGraph,
    pub routes: RouteManifest,
    pub exports: CompiledExports,
}

impl BuildInputs {
    /// Read the three JSON inputs. Relative paths are taken from `cwd`.
    pub fn from_files(cwd: &Path, graph: &Path, routes: &Path, exports: &Path) -> Result<Self> {
        Self::from_runtime(&kiln_graph::NativeRuntime, cwd, graph, routes, exports)
    }

    /// Like [`BuildInputs::from_files`], reading through `runtime`.
    pub fn from_runtime(
        runtime: &dyn Runtime,
        cwd: &Path,
        graph: &Path,
        routes: &Path,
        exports: &Path,
    ) -> Result<Self> {
        let read = |path: &Path| {
            let path = cwd.join(path);
            runtime
                .read_to_string(&path)
                .map_err(|source| Error::Read { path, source })
        };

        Ok(Self {
            graph: ArtifactGraph::from_json(&read(graph)?)?,
            routes: RouteManifest::from_json(&read(routes)?)?,
            exports: CompiledExports::from_json(&read(exports)?, runtime, cwd)?,
        })
    }
}

/// What a build wrote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub server_entry: PathBuf,
    pub nodes: Vec<PathBuf>,
    pub stylesheets: Vec<PathBuf>,
    pub matchers: PathBuf,
    pub methods_file: PathBuf,
    #[serde(skip)]
    pub inline_table: InlineTable,
    pub methods: MethodTable,
    pub dangling: Vec<DanglingReference>,
}

/// The server build for one project.
pub struct ServerBuild<'a> {
    config: &'a KilnConfig,
    runtime: Arc<dyn Runtime>,
    cwd: PathBuf,
}

impl<'a> ServerBuild<'a> {
    pub fn new(config: &'a KilnConfig, runtime: Arc<dyn Runtime>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            config,
            runtime,
            cwd: cwd.into(),
        }
    }

    pub fn server_out_dir(&self) -> PathBuf {
        self.cwd.join(self.config.server_out_dir())
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Stops at the first failure: an unreadable template, a module missing
    /// from the artifact graph, an unreadable stylesheet or a failed write.
    pub fn run(&self, inputs: &BuildInputs) -> Result<BuildReport> {
        let writer = OutputWriter::new(self.runtime.clone(), self.server_out_dir());
        let identity = IdentityReconciler::new(&inputs.graph, self.runtime.clone(), &self.cwd);

        let dangling = identity.dangling_references();
        for reference in &dangling {
            warn!(
                importer = %reference.importer,
                target = %reference.target,
                "artifact graph references a module it does not contain"
            );
        }

        let templates = Templates::load(self.config, &self.runtime, &self.cwd)?;
        let hooks = match self.find_hooks() {
            Some(source) => {
                let module = identity.canonicalize(&source)?;
                debug!(source, chunk = %module.entry.compiled_file, "found server hooks");
                Some(format!("./{}", module.entry.compiled_file))
            }
            None => None,
        };
        let entry_module = emit_server_entry(self.config, hooks.as_deref(), &templates)?;

        let resolver = Resolver::with_identity(identity);
        let emitter = NodeEmitter::new(&resolver);
        let mut inliner = StylesheetInliner::new(
            self.runtime.clone(),
            self.cwd.join(self.config.client_out_dir()),
            self.config.inline_style_threshold,
        );

        let records = inputs
            .routes
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| emitter.record(index, node, &mut inliner))
            .collect::<Result<Vec<NodeManifestRecord>>>()?;
        let (inline_table, stylesheet_modules) = inliner.into_parts();

        let matchers_module = emit_matchers(&inputs.routes, resolver.identity())?;
        let methods = extract_methods(&inputs.routes.routes, &inputs.exports);
        let methods_json = methods.to_json()?;

        // Everything is rendered; only writes can fail from here on.
        let server_entry = writer.write(SERVER_ENTRY_MODULE, &entry_module)?;
        let stylesheets = stylesheet_modules
            .iter()
            .map(|module| writer.write(&module.module_path(), &module.contents))
            .collect::<Result<Vec<_>>>()?;
        let nodes = records
            .par_iter()
            .map(|record| writer.write(&record.module_path(), &record.render()))
            .collect::<Result<Vec<_>>>()?;
        let matchers = writer.write(MATCHERS_MODULE, &matchers_module)?;
        let methods_file = writer.write(METHODS_FILE, &methods_json)?;

        info!(
            nodes = nodes.len(),
            inlined = inline_table.len(),
            routes = methods.len(),
            out_dir = %writer.root().display(),
            "server build complete"
        );

        Ok(BuildReport {
            server_entry,
            nodes,
            stylesheets,
            matchers,
            methods_file,
            inline_table,
            methods,
            dangling,
        })
    }

    /// Project-relative path of the server hooks module, if one exists.
    fn find_hooks(&self) -> Option<String> {
        let base = self.config.files.hooks_server.to_string_lossy().replace('\\', "/");
        ["js", "ts"]
            .iter()
            .map(|ext| format!("{base}.{ext}"))
            .find(|candidate| self.runtime.exists(&self.cwd.join(candidate)))
    }
}

#[cfg(test)]
mod tests {
    use kiln_graph::{ArtifactEntry, TestRuntime};

    use super::*;

    #[test]
    fn test_find_hooks_prefers_js() {
        let config = KilnConfig::default();
        let runtime = Arc::new(
            TestRuntime::new("/app")
                .with_file("src/hooks.server.ts", "")
                .with_file("src/hooks.server.js", ""),
        );

        let build = ServerBuild::new(&config, runtime, "/app");
        assert_eq!(build.find_hooks().as_deref(), Some("src/hooks.server.js"));
    }

    #[test]
    fn test_find_hooks_none() {
        let config = KilnConfig::default();
        let build = ServerBuild::new(&config, Arc::new(TestRuntime::new("/app")), "/app");
        assert_eq!(build.find_hooks(), None);
    }

    #[test]
    fn test_inputs_from_runtime() {
        let runtime = TestRuntime::new("/app")
            .with_file(
                "manifest.json",
                r#"{ "src/a.js": { "file": "a.js", "imports": ["src/b.js"] }, "src/b.js": { "file": "b.js" } }"#,
            )
            .with_file("routes.json", r#"{ "nodes": [{ "component": "src/a.js" }] }"#)
            .with_file("exports.json", r#"{ "src/a.js": ["GET"] }"#);

        let inputs = BuildInputs::from_runtime(
            &runtime,
            Path::new("/app"),
            Path::new("manifest.json"),
            Path::new("routes.json"),
            Path::new("exports.json"),
        )
        .unwrap();

        assert_eq!(inputs.graph.len(), 2);
        assert_eq!(inputs.routes.nodes.len(), 1);
        assert_eq!(inputs.exports.get("src/a.js"), Some(&["GET".to_string()][..]));
        assert_eq!(
            inputs.graph.get("src/a.js"),
            Some(&ArtifactEntry::new("a.js").with_import("src/b.js"))
        );
    }

    #[test]
    fn test_inputs_missing_file() {
        let runtime = TestRuntime::new("/app");
        let err = BuildInputs::from_runtime(
            &runtime,
            Path::new("/app"),
            Path::new("manifest.json"),
            Path::new("routes.json"),
            Path::new("exports.json"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Read { ref path, .. } if path == Path::new("/app/manifest.json")));
    }
}
