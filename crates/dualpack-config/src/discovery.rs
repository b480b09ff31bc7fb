//! Filesystem discovery of the workspace root and project records.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::project::PROJECT_FILE;
use crate::settings::SETTINGS_FILE;

/// Files that mark a workspace root, in priority order.
const WORKSPACE_MARKERS: &[&str] = &[SETTINGS_FILE, "nx.json"];

/// Find the nearest `project.json` in `start` or one of its ancestors.
pub fn find_project_file(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ConfigError::ProjectNotFound(start.to_path_buf()))
}

/// Find the workspace root for `start`.
///
/// The nearest ancestor holding a workspace marker wins. Without one, the
/// nearest `package.json` declaring `workspaces` is used.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    if let Some(dir) = start.ancestors().find(|dir| {
        WORKSPACE_MARKERS
            .iter()
            .any(|marker| dir.join(marker).is_file())
    }) {
        return Ok(dir.to_path_buf());
    }

    start
        .ancestors()
        .find(|dir| declares_workspaces(&dir.join("package.json")))
        .map(Path::to_path_buf)
        .ok_or_else(|| ConfigError::WorkspaceNotFound(start.to_path_buf()))
}

fn declares_workspaces(manifest: &Path) -> bool {
    let Ok(content) = fs::read_to_string(manifest) else {
        return false;
    };
    serde_json::from_str::<Value>(&content)
        .map(|parsed| parsed.get("workspaces").is_some_and(|w| !w.is_null()))
        .unwrap_or(false)
}
