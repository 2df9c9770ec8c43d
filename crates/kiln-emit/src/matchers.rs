//! `matchers.js`: lazy loader for route parameter matchers.

use kiln_graph::{IdentityReconciler, RouteManifest};

use crate::{Result, js};

/// Output path of the matchers module relative to the server output directory.
pub const MATCHERS_MODULE: &str = "matchers.js";

/// Render the matchers module for `manifest`.
///
/// Matcher files are looked up through `identity`, so a matcher reached via
/// a symlink resolves to the chunk compiled for its physical file.
///
/// # Errors
///
/// A matcher file missing from the artifact graph.
pub fn emit_matchers(manifest: &RouteManifest, identity: &IdentityReconciler<'_>) -> Result<String> {
    if manifest.matchers.is_empty() {
        return Ok("export const matchers = async () => ({});\n".to_string());
    }

    let mut imports = String::new();
    let mut fields = Vec::with_capacity(manifest.matchers.len());

    for (i, (name, file)) in manifest.matchers.iter().enumerate() {
        let module = identity.canonicalize(file)?;
        imports.push_str(&format!(
            "\tconst {{ match: matcher_{i} }} = await import({});\n",
            js::string(&format!("./{}", module.entry.compiled_file))
        ));
        fields.push(format!("{}: matcher_{i}", js::string(name)));
    }

    Ok(format!(
        "export const matchers = async () => {{\n{imports}\treturn {{ {} }};\n}};\n",
        fields.join(", ")
    ))
}
