//! Workspace-wide settings (`dualpack.json` + `DUALPACK_*` environment).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the workspace settings file.
pub const SETTINGS_FILE: &str = "dualpack.json";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "DUALPACK_";

/// Command used to run the bundling engine for one format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    pub engine: EngineSettings,
    /// Target built when none is named on the command line.
    pub target: String,
    /// Project-graph JSON file, relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<PathBuf>,
    /// Log level used when neither flags nor `RUST_LOG` choose one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Interpreter that runs config adjuster scripts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjuster: Option<String>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            target: "build".to_string(),
            graph: None,
            log: None,
            adjuster: None,
        }
    }
}

impl WorkspaceSettings {
    /// Load settings for the workspace at `root`.
    ///
    /// Priority: environment > `dualpack.json` > defaults. Nested keys use a
    /// double underscore, e.g. `DUALPACK_ENGINE__COMMAND`.
    pub fn load(root: &Path) -> Result<Self> {
        Self::figment(root).extract().map_err(Into::into)
    }

    pub fn figment(root: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Json::file(root.join(SETTINGS_FILE)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Graph file resolved against the workspace root.
    pub fn graph_path(&self, root: &Path) -> Option<PathBuf> {
        self.graph.as_ref().map(|graph| root.join(graph))
    }
}
