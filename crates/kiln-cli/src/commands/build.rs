//! `kiln build`.

use std::sync::Arc;
use std::time::Instant;

use kiln_config::ConfigLoader;
use kiln_emit::{BuildInputs, CompiledExports, ServerBuild};
use kiln_graph::{ArtifactGraph, NativeRuntime, RouteManifest};
use tracing::debug;

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Load configuration and inputs, run the server build, print a summary.
///
/// # Errors
///
/// Configuration, unreadable inputs, or any build failure.
pub fn execute(args: BuildArgs) -> Result<()> {
    let start = Instant::now();
    let cwd = utils::project_root(args.input.cwd.as_deref())?;

    let mut loader = ConfigLoader::new(&cwd);
    if let Some(file) = &args.config {
        loader = loader.file(cwd.join(file));
    }
    let mut config = loader.load()?;
    if let Some(out_dir) = args.out_dir {
        config.out_dir = out_dir;
    }
    if let Some(threshold) = args.inline_threshold {
        config.inline_style_threshold = threshold;
    }
    config.validate()?;
    debug!(?config, "loaded configuration");

    let inputs = BuildInputs {
        graph: ArtifactGraph::from_json(&utils::read_input(&cwd, &args.input.graph)?)?,
        routes: RouteManifest::from_json(&utils::read_input(&cwd, &args.input.routes)?)?,
        exports: CompiledExports::from_json(
            &utils::read_input(&cwd, &args.input.exports)?,
            &NativeRuntime,
            &cwd,
        )?,
    };
    ui::info(&format!(
        "Building {} node(s) from {} module(s)",
        inputs.routes.nodes.len(),
        inputs.graph.len()
    ));

    let report = ServerBuild::new(&config, Arc::new(NativeRuntime), &cwd).run(&inputs)?;

    if !report.dangling.is_empty() {
        ui::warning(&format!(
            "{} import(s) point at modules missing from the artifact graph",
            report.dangling.len()
        ));
    }
    ui::print_build_summary(&report, &cwd, start.elapsed());
    ui::success("Server build complete");

    Ok(())
}
