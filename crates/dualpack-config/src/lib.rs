//! Configuration layer for dualpack.
//!
//! Provides the user-facing option schema ([`RawOptions`]), project records
//! (`project.json`) with targets and named configurations, layered option
//! loading through `figment`, workspace settings, and discovery helpers.

pub mod discovery;
pub mod error;
pub mod loading;
pub mod options;
pub mod project;
pub mod settings;
pub mod validation;

pub use discovery::{find_project_file, find_workspace_root};
pub use error::{ConfigError, Result};
pub use loading::{OptionSelection, load_options, options_figment};
pub use options::*;
pub use project::{PROJECT_FILE, ProjectConfig, TargetConfig};
pub use settings::{ENV_PREFIX, EngineSettings, SETTINGS_FILE, WorkspaceSettings};
pub use validation::validate;
