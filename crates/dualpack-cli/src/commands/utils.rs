//! Workspace discovery shared by the commands.

use std::path::{Path, PathBuf};

use dualpack_bundler::{BuildRequest, ExecutorContext, LogLevel, ProjectGraph};
use dualpack_config::{
    OptionSelection, ProjectConfig, WorkspaceSettings, find_project_file, find_workspace_root,
    load_options,
};
use path_clean::PathClean;

use crate::cli::SelectionArgs;
use crate::config::Overrides;
use crate::engine::ProcessAdjusterLoader;
use crate::error::{CliError, Result};

/// Absolute working directory, honouring `--cwd`.
pub fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(dir) => current.join(dir).clean(),
        None => current,
    })
}

/// Log level from the workspace settings around `cwd`, if any.
///
/// Used before the logger exists, so every failure is ignored here and
/// reported again by the command itself.
pub fn settings_log_level(cwd: &Path) -> Option<LogLevel> {
    let root = find_workspace_root(cwd).ok()?;
    let settings = WorkspaceSettings::load(&root).ok()?;
    settings.log?.parse().ok()
}

/// The project being built and the workspace around it.
#[derive(Debug)]
pub(crate) struct Session {
    pub root: PathBuf,
    pub settings: WorkspaceSettings,
    pub project: ProjectConfig,
    pub target: String,
    pub configuration: Option<String>,
    pub context: ExecutorContext,
}

impl Session {
    pub(crate) fn open(cwd: &Path, selection: &SelectionArgs) -> Result<Self> {
        let start = match &selection.project_dir {
            Some(dir) => cwd.join(dir).clean(),
            None => cwd.to_path_buf(),
        };
        if !start.is_dir() {
            return Err(CliError::FileNotFound(start));
        }

        let root = find_workspace_root(&start)?;
        let settings = WorkspaceSettings::load(&root)?;
        let project_file = find_project_file(&start)?;
        let project = ProjectConfig::load(&project_file, &root)?;
        let target = selection
            .target
            .clone()
            .unwrap_or_else(|| settings.target.clone());

        let mut context = ExecutorContext::new(&root, &project, &target);
        let graph = selection
            .graph
            .as_ref()
            .map(|graph| cwd.join(graph))
            .or_else(|| settings.graph_path(&root));
        if let Some(path) = graph {
            context = context.with_graph(&ProjectGraph::load(&path)?);
        }

        tracing::debug!(
            root = %root.display(),
            project = %project.name,
            target = %target,
            "opened workspace"
        );
        Ok(Self {
            root,
            settings,
            project,
            target,
            configuration: selection.configuration.clone(),
            context,
        })
    }

    /// Load the target options and prepare the build.
    pub(crate) async fn prepare(&self, overrides: &Overrides) -> Result<BuildRequest> {
        let selection =
            OptionSelection::new(&self.target).with_configuration(self.configuration.clone());
        let raw = load_options(&self.project, &selection, overrides)?;
        Ok(BuildRequest::prepare(raw, &self.context).await?)
    }

    pub(crate) fn adjuster_loader(&self) -> ProcessAdjusterLoader {
        let loader = ProcessAdjusterLoader::new(&self.root);
        match &self.settings.adjuster {
            Some(interpreter) => loader.with_interpreter(interpreter),
            None => loader,
        }
    }
}
