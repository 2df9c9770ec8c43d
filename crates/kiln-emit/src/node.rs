//! Per-node server modules.
//!
//! Each route node becomes `nodes/{index}.js`: the node's own index, loaders
//! for its component and universal logic, the server logic re-exported
//! directly, and the chunks, stylesheets and fonts the node needs on first
//! paint. Stylesheets that were inlined are also exposed through an
//! `inline_styles` accessor keyed by asset path.

use indexmap::IndexSet;
use kiln_graph::{NodeRole, Resolver, RouteNode};
use serde::Serialize;
use tracing::debug;

use crate::inline::{StylesheetInliner, stylesheet_module_path};
use crate::{Result, js};

/// One role's module as seen from a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderRef {
    #[serde(skip)]
    pub role: NodeRole,
    /// Source path from the route manifest.
    pub source: String,
    /// Compiled file, relative to the server output directory.
    pub chunk: String,
}

/// An inlined stylesheet reachable from a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineStyle {
    pub path: String,
    pub slot: usize,
}

/// Everything that goes into one node module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeManifestRecord {
    pub index: usize,
    pub loaders: Vec<LoaderRef>,
    pub imports: IndexSet<String>,
    pub stylesheets: IndexSet<String>,
    pub fonts: IndexSet<String>,
    pub inline_styles: Vec<InlineStyle>,
}

impl NodeManifestRecord {
    /// Output path relative to the server output directory.
    pub fn module_path(&self) -> String {
        format!("nodes/{}.js", self.index)
    }

    pub fn loader(&self, role: NodeRole) -> Option<&LoaderRef> {
        self.loaders.iter().find(|loader| loader.role == role)
    }

    /// Render the node module.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(server) = self.loader(NodeRole::ServerLogic) {
            out.push_str(&format!(
                "import * as server from {};\n",
                js::string(&format!("../{}", server.chunk))
            ));
        }
        for style in &self.inline_styles {
            out.push_str(&format!(
                "import stylesheet_{} from {};\n",
                style.slot,
                js::string(&format!("../{}", stylesheet_module_path(style.slot)))
            ));
        }
        if !out.is_empty() {
            out.push('\n');
        }

        out.push_str(&format!("export const index = {};\n", self.index));

        for loader in &self.loaders {
            let name = loader.role.export_name();
            if loader.role.is_lazy() {
                let specifier = js::string(&format!("../{}", loader.chunk));
                let import = match loader.role {
                    NodeRole::Component => format!("(await import({specifier})).default"),
                    _ => format!("(await import({specifier}))"),
                };
                out.push_str(&format!("let {name}_cache;\n"));
                out.push_str(&format!(
                    "export const {name} = async () => {name}_cache ??= {import};\n"
                ));
            } else {
                out.push_str(&format!("export {{ {name} }};\n"));
            }
            out.push_str(&format!(
                "export const {name}_id = {};\n",
                js::string(&loader.source)
            ));
        }

        out.push_str(&format!(
            "export const imports = {};\n",
            js::string_array(&self.imports)
        ));
        out.push_str(&format!(
            "export const stylesheets = {};\n",
            js::string_array(&self.stylesheets)
        ));
        out.push_str(&format!(
            "export const fonts = {};\n",
            js::string_array(&self.fonts)
        ));

        if !self.inline_styles.is_empty() {
            let entries: Vec<String> = self
                .inline_styles
                .iter()
                .map(|style| format!("\t{}: stylesheet_{}", js::string(&style.path), style.slot))
                .collect();
            out.push_str(&format!(
                "export const inline_styles = () => ({{\n{}\n}});\n",
                entries.join(",\n")
            ));
        }

        out
    }
}

/// Builds node records from a shared [`Resolver`].
///
/// Records must be built one at a time in manifest order; the inliner
/// assigns slots in the order stylesheets are first seen.
#[derive(Debug, Clone, Copy)]
pub struct NodeEmitter<'r, 'g> {
    resolver: &'r Resolver<'g>,
}

impl<'r, 'g> NodeEmitter<'r, 'g> {
    pub fn new(resolver: &'r Resolver<'g>) -> Self {
        Self { resolver }
    }

    /// Resolve every role of `node` and merge the results.
    ///
    /// # Errors
    ///
    /// Any resolution error for a role file, or a stylesheet that should be
    /// inlined but cannot be read. Slots assigned before the failure stay
    /// assigned.
    pub fn record(
        &self,
        index: usize,
        node: &RouteNode,
        inliner: &mut StylesheetInliner,
    ) -> Result<NodeManifestRecord> {
        let mut record = NodeManifestRecord {
            index,
            ..NodeManifestRecord::default()
        };
        let mut own_files = IndexSet::new();

        for (role, file) in node.roles() {
            let resolved = self.resolver.resolve(file)?;
            own_files.insert(resolved.file.clone());
            record.imports.extend(resolved.imported_chunks);
            record.stylesheets.extend(resolved.stylesheets);
            record.fonts.extend(resolved.fonts);
            record.loaders.push(LoaderRef {
                role,
                source: file.to_string(),
                chunk: resolved.file,
            });
        }
        record.imports.retain(|chunk| !own_files.contains(chunk));

        for path in &record.stylesheets {
            if let Some(slot) = inliner.inline(path)? {
                record.inline_styles.push(InlineStyle {
                    path: path.clone(),
                    slot,
                });
            }
        }

        debug!(
            index,
            imports = record.imports.len(),
            stylesheets = record.stylesheets.len(),
            inlined = record.inline_styles.len(),
            "resolved node"
        );
        Ok(record)
    }

    /// Resolve `node` and render its module text.
    pub fn emit(
        &self,
        index: usize,
        node: &RouteNode,
        inliner: &mut StylesheetInliner,
    ) -> Result<String> {
        Ok(self.record(index, node, inliner)?.render())
    }
}
