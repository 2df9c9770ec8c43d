//! Command-line interface definition.
//!
//! - `kiln build` - generate the server output
//! - `kiln resolve <MODULE>` - print one module's transitive assets
//! - `kiln methods` - print the route method table

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, InputArgs, MethodsArgs, ResolveArgs};

/// Kiln - server build step for server-rendered apps
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Generate server manifests from compiled client and server bundles",
    long_about = "Kiln reads the compiler's artifact graph and the app's route manifest and\n\
                  writes the server entry, one module per route node, inlined stylesheets\n\
                  and the route method table."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
