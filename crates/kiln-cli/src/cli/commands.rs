use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the server output
    ///
    /// Writes index.js, nodes/{i}.js, stylesheets/{n}.js, matchers.js and
    /// methods.json under `{out_dir}/server`.
    Build(BuildArgs),

    /// Print the chunks, stylesheets and fonts one module needs, as JSON
    Resolve(ResolveArgs),

    /// Print the HTTP methods each route handler exports, as JSON
    Methods(MethodsArgs),
}

/// Project root and the compiler output files read from it.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Artifact graph written by the compiler
    #[arg(long, default_value = "manifest.json", value_name = "FILE")]
    pub graph: PathBuf,

    /// Route manifest
    #[arg(long, default_value = "routes.json", value_name = "FILE")]
    pub routes: PathBuf,

    /// Compiled export names, as a `{ file: [exports] }` table or the
    /// compiler's chunk list
    #[arg(long, default_value = "exports.json", value_name = "FILE")]
    pub exports: PathBuf,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Config file (defaults to kiln.toml or kiln.json in the project root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override `out_dir`
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Override `inline_style_threshold` (bytes, 0 disables inlining)
    #[arg(long, value_name = "BYTES")]
    pub inline_threshold: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Source path of the module, as keyed in the artifact graph
    #[arg(value_name = "MODULE")]
    pub module: String,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Artifact graph written by the compiler
    #[arg(long, default_value = "manifest.json", value_name = "FILE")]
    pub graph: PathBuf,
}

#[derive(Args, Debug)]
pub struct MethodsArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Route manifest
    #[arg(long, default_value = "routes.json", value_name = "FILE")]
    pub routes: PathBuf,

    /// Compiled export names
    #[arg(long, default_value = "exports.json", value_name = "FILE")]
    pub exports: PathBuf,
}
