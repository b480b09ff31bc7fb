//! Conversion from CLI errors to miette reports.

use miette::Report;

use super::CliError;

/// Convert a [`CliError`] into a report for `main`.
///
/// Pipeline errors keep their diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(err) => Report::new(err),
        CliError::Config(err) => miette::miette!(
            code = "dualpack::configuration",
            "Configuration error: {}",
            err
        ),
        other => miette::miette!("{}", other),
    }
}
