//! Error types for option validation and project loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Discovery errors
    #[error("no project.json found in {0} or any parent directory")]
    ProjectNotFound(PathBuf),

    #[error("workspace root could not be determined from {0}")]
    WorkspaceNotFound(PathBuf),

    // Project record errors
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("project '{project}' has no target named '{target}'")]
    UnknownTarget { project: String, target: String },

    #[error("target '{target}' has no configuration named '{configuration}'")]
    UnknownConfiguration {
        target: String,
        configuration: String,
    },

    // Option validation errors
    #[error("missing required option: {0}")]
    MissingOption(&'static str),

    #[error("invalid option value: {0}")]
    InvalidValue(String),

    #[error("failed to extract options: {0}")]
    Extract(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(err.to_string())
    }
}
