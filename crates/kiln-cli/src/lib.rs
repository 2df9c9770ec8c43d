//! Kiln CLI - runs the server build step from compiler output.
//!
//! The binary reads three JSON files produced by the client and server
//! compiles (artifact graph, route manifest, compiled exports), loads
//! `kiln.toml`, and writes the generated server modules.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - one module per subcommand
//! - [`error`] - [`CliError`] and its miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
