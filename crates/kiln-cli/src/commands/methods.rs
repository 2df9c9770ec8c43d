//! `kiln methods`.

use kiln_emit::{CompiledExports, extract_methods};
use kiln_graph::{NativeRuntime, RouteManifest};

use crate::cli::MethodsArgs;
use crate::commands::utils;
use crate::error::Result;

/// Print the route method table as pretty JSON on stdout.
pub fn execute(args: MethodsArgs) -> Result<()> {
    let cwd = utils::project_root(args.cwd.as_deref())?;
    let routes = RouteManifest::from_json(&utils::read_input(&cwd, &args.routes)?)?;
    let exports =
        CompiledExports::from_json(&utils::read_input(&cwd, &args.exports)?, &NativeRuntime, &cwd)?;

    let table = extract_methods(&routes.routes, &exports);
    println!("{}", table.to_json()?);
    Ok(())
}
