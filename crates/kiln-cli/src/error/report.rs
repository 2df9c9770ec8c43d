//! Miette rendering for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a report, keeping diagnostic codes and help
/// from the library errors.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Emit(e) => Report::new(e),
        CliError::Graph(e) => Report::new(kiln_emit::Error::from(e)),
        CliError::Config(e) => match e.hint() {
            Some(hint) => miette::miette!(help = hint.to_string(), "Configuration error: {}", e),
            None => miette::miette!("Configuration error: {}", e),
        },
        CliError::FileNotFound(path) => miette::miette!(
            help = "Pass the file explicitly with --graph, --routes or --exports, or set --cwd",
            "File not found: {}",
            path.display()
        ),
        other => miette::miette!("{}", other),
    }
}
