//! `kiln resolve`.

use std::sync::Arc;

use kiln_graph::{ArtifactGraph, NativeRuntime, Resolver};

use crate::cli::ResolveArgs;
use crate::commands::utils;
use crate::error::Result;

/// Print the resolved entry for one module as pretty JSON on stdout.
pub fn execute(args: ResolveArgs) -> Result<()> {
    let cwd = utils::project_root(args.cwd.as_deref())?;
    let graph = ArtifactGraph::from_json(&utils::read_input(&cwd, &args.graph)?)?;

    let resolved = Resolver::new(&graph, Arc::new(NativeRuntime), &cwd).resolve(&args.module)?;

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
