//! Error handling for the dualpack CLI.
//!
//! Commands return [`CliError`]. Library errors convert into it through
//! `#[from]`, and `main` renders whatever comes back as a miette report.

mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Project record, target or option errors
    #[error("Configuration error: {0}")]
    Config(#[from] dualpack_config::ConfigError),

    /// Build outcome errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Errors raised by the build pipeline itself
    #[error(transparent)]
    Bundler(#[from] dualpack_bundler::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Errors about the outcome of a build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// At least one format failed; the manifest was left untouched
    #[error("Bundle failed: {0}\n\nHint: Fix the errors reported above and run the build again")]
    Failed(String),

    /// No engine command in flags, settings or environment
    #[error("No bundling engine configured\n\nHint: Pass --engine <CMD>, set engine.command in dualpack.json, or export DUALPACK_ENGINE__COMMAND")]
    NoEngine,

    /// The engine command could not be started
    #[error("Failed to start engine '{command}': {message}\n\nHint: Check that the command is installed and on PATH")]
    EngineSpawn { command: String, message: String },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}
