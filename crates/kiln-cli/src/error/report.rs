//! Conversion of CLI errors into miette reports.

use miette::Report;

use crate::error::{BuildError, CliError};

/// Render `err` as a miette report. Pipeline failures keep their
/// diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(BuildError::Failed(failure)) => Report::new(failure),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        other => miette::miette!("{}", other),
    }
}
