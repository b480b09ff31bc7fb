//! Project records (`project.json`).
//!
//! A project record names the project, locates its root and source root
//! inside the workspace, and declares build targets. Each target carries a
//! base `options` object plus named `configurations` layered over it.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// File name of a project record.
pub const PROJECT_FILE: &str = "project.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    pub options: Value,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub configurations: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl TargetConfig {
    /// Value of `options.outputPath`, when it is a string.
    pub fn output_path(&self) -> Option<&str> {
        self.options.get("outputPath").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub name: String,
    /// Project root relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Source root relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub targets: IndexMap<String, TargetConfig>,
}

impl ProjectConfig {
    /// Parse a project record from a JSON string.
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Load a project record and fill in `name` and `root` when absent.
    ///
    /// `root` is derived from the record's location relative to
    /// `workspace_root`; `name` falls back to the directory name.
    pub fn load(path: &Path, workspace_root: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut project = Self::from_json(&content, path)?;

        let dir = path.parent().unwrap_or(Path::new("."));
        if project.root.is_none() {
            let relative = dir.strip_prefix(workspace_root).unwrap_or(dir);
            project.root = Some(to_forward_slashes(relative));
        }
        if project.name.is_empty() {
            project.name = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        tracing::debug!(project = %project.name, path = %path.display(), "loaded project record");
        Ok(project)
    }

    pub fn target(&self, name: &str) -> Result<&TargetConfig> {
        self.targets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownTarget {
                project: self.name.clone(),
                target: name.to_string(),
            })
    }

    /// Project root relative to the workspace root (`""` for the root project).
    pub fn root(&self) -> &str {
        self.root.as_deref().unwrap_or("")
    }

    /// Project root as an absolute path under `workspace_root`.
    pub fn root_dir(&self, workspace_root: &Path) -> PathBuf {
        if self.root().is_empty() {
            workspace_root.to_path_buf()
        } else {
            workspace_root.join(self.root())
        }
    }

    /// Source root, defaulting to `<root>/src`.
    pub fn source_root(&self) -> String {
        match &self.source_root {
            Some(source_root) => source_root.clone(),
            None if self.root().is_empty() => "src".to_string(),
            None => format!("{}/src", self.root()),
        }
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RECORD: &str = r#"{
        "name": "ui",
        "sourceRoot": "libs/ui/src",
        "targets": {
            "build": {
                "executor": "dualpack:build",
                "outputs": ["{options.outputPath}"],
                "options": { "main": "libs/ui/src/index.ts", "outputPath": "dist/libs/ui" },
                "configurations": { "development": { "mode": "development" } }
            }
        }
    }"#;

    #[test]
    fn loads_record_and_derives_root() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("libs/ui");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROJECT_FILE), RECORD).unwrap();

        let project = ProjectConfig::load(&dir.join(PROJECT_FILE), temp.path()).unwrap();
        assert_eq!(project.name, "ui");
        assert_eq!(project.root(), "libs/ui");
        assert_eq!(project.source_root(), "libs/ui/src");
        assert_eq!(project.root_dir(temp.path()), dir);

        let build = project.target("build").unwrap();
        assert_eq!(build.output_path(), Some("dist/libs/ui"));
        assert!(build.configurations.contains_key("development"));
    }

    #[test]
    fn name_falls_back_to_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("libs/widgets");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROJECT_FILE), r#"{ "targets": {} }"#).unwrap();

        let project = ProjectConfig::load(&dir.join(PROJECT_FILE), temp.path()).unwrap();
        assert_eq!(project.name, "widgets");
        assert_eq!(project.source_root(), "libs/widgets/src");
    }

    #[test]
    fn unknown_target_is_reported() {
        let project = ProjectConfig::from_json(RECORD, Path::new(PROJECT_FILE)).unwrap();
        let err = project.target("test").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget { .. }));
        assert!(err.to_string().contains("'test'"));
    }

    #[test]
    fn malformed_record_is_a_parse_error() {
        let err = ProjectConfig::from_json("{ nope", Path::new(PROJECT_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
