//! Workspace collaborator model.
//!
//! The workspace supplies the project's root and source directories and a
//! project graph. From the graph we only need the direct dependencies of the
//! project being built: registry packages (`npm:` nodes) and workspace
//! projects that are built by the same target.

use std::fs;
use std::path::{Path, PathBuf};

use dualpack_config::{ProjectConfig, TargetConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Prefix of registry package nodes in the project graph.
const NPM_PREFIX: &str = "npm:";

/// A workspace dependency that produces its own build artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildableDependency {
    /// Package name used in import specifiers.
    pub name: String,
    /// Output locations, relative to the workspace root.
    pub outputs: Vec<String>,
    /// Name of the workspace project.
    pub project: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphNode {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub data: ProjectConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Project graph as exported by the host task runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectGraph {
    pub nodes: IndexMap<String, GraphNode>,
    pub dependencies: IndexMap<String, Vec<GraphEdge>>,
}

impl ProjectGraph {
    /// Parse a graph document, accepting both the bare graph and a
    /// `{ "graph": ... }` wrapper.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(content)
            .map_err(|err| Error::Configuration(format!("invalid project graph: {err}")))?;
        if let Some(inner) = value.get_mut("graph").map(Value::take) {
            value = inner;
        }
        serde_json::from_value(value)
            .map_err(|err| Error::Configuration(format!("invalid project graph: {err}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        Self::from_json(&content)
    }

    fn edges(&self, project: &str) -> &[GraphEdge] {
        self.dependencies
            .get(project)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registry dependencies of `project`, with the `npm:` prefix removed.
    pub fn npm_dependencies(&self, project: &str) -> Vec<String> {
        self.edges(project)
            .iter()
            .filter_map(|edge| edge.target.strip_prefix(NPM_PREFIX))
            .map(str::to_string)
            .collect()
    }

    /// Direct workspace dependencies of `project` that define `target`.
    pub fn buildable_dependencies(
        &self,
        project: &str,
        target: &str,
        workspace_root: &Path,
    ) -> Vec<BuildableDependency> {
        self.edges(project)
            .iter()
            .filter(|edge| !edge.target.starts_with(NPM_PREFIX))
            .filter_map(|edge| {
                let node = self.nodes.get(&edge.target)?;
                let build = node.data.targets.get(target)?;
                Some(BuildableDependency {
                    name: package_name(workspace_root, node),
                    outputs: interpolate_outputs(build, node.data.root()),
                    project: edge.target.clone(),
                })
            })
            .collect()
    }
}

fn package_name(workspace_root: &Path, node: &GraphNode) -> String {
    let manifest = node.data.root_dir(workspace_root).join("package.json");
    fs::read_to_string(manifest)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok())
        .and_then(|parsed| parsed.get("name").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| node.name.clone())
}

fn interpolate_outputs(target: &TargetConfig, project_root: &str) -> Vec<String> {
    if target.outputs.is_empty() {
        return target.output_path().map(str::to_string).into_iter().collect();
    }

    target
        .outputs
        .iter()
        .filter_map(|output| {
            let mut resolved = output
                .replace("{workspaceRoot}/", "")
                .replace("{projectRoot}", project_root);
            if resolved.contains("{options.outputPath}") {
                resolved = resolved.replace("{options.outputPath}", target.output_path()?);
            }
            Some(resolved)
        })
        .collect()
}

/// Everything the build needs from the host workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorContext {
    pub workspace_root: PathBuf,
    pub project_name: String,
    /// Project root relative to the workspace root.
    pub project_root: String,
    /// Source root relative to the workspace root.
    pub source_root: String,
    pub target_name: String,
    pub dependencies: Vec<BuildableDependency>,
    pub npm_dependencies: Vec<String>,
}

impl ExecutorContext {
    pub fn new(workspace_root: impl Into<PathBuf>, project: &ProjectConfig, target: &str) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            project_name: project.name.clone(),
            project_root: project.root().to_string(),
            source_root: project.source_root(),
            target_name: target.to_string(),
            dependencies: Vec::new(),
            npm_dependencies: Vec::new(),
        }
    }

    /// Fill in the dependency records from a project graph.
    pub fn with_graph(mut self, graph: &ProjectGraph) -> Self {
        self.dependencies =
            graph.buildable_dependencies(&self.project_name, &self.target_name, &self.workspace_root);
        self.npm_dependencies = graph.npm_dependencies(&self.project_name);
        tracing::debug!(
            project = %self.project_name,
            buildable = self.dependencies.len(),
            npm = self.npm_dependencies.len(),
            "resolved project dependencies"
        );
        self
    }
}
