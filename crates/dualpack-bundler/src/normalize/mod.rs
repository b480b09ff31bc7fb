//! Option normalization.
//!
//! Resolves every path in [`RawOptions`] against the workspace root,
//! deduplicates the requested formats, converts assets into copy rules,
//! expands secondary entry points, and resolves config-adjuster specifiers.
//! The result is immutable for the rest of the build.

mod assets;
mod entries;
mod plugins;

use std::path::{Path, PathBuf};

use dualpack_config::{
    BuildMode, Compiler, ExternalPolicy, ExtractCss, Format, OneOrMany, RawOptions,
};
use indexmap::IndexSet;
use path_clean::PathClean;
use serde::Serialize;

use crate::workspace::ExecutorContext;
use crate::{Error, Result};

pub use assets::{AssetEntry, normalize_asset};
pub use entries::expand_entry_points;
pub use plugins::{PluginKind, PluginResolver, ResolvedPlugin};

/// Fully resolved build options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOptions {
    pub workspace_root: PathBuf,
    pub project_name: String,
    /// Primary entry file.
    pub main: PathBuf,
    /// Directory containing `main`.
    pub entry_root: PathBuf,
    /// Manifest path.
    pub project: PathBuf,
    /// Directory containing the manifest.
    pub project_root: PathBuf,
    /// Source root relative to the workspace root.
    pub source_root: String,
    pub output_path: PathBuf,
    pub output_file_name: Option<String>,
    pub delete_output_path: bool,
    pub ts_config: PathBuf,
    pub allow_js: bool,
    /// Requested formats, deduplicated in first-seen order. May be empty.
    pub formats: Vec<Format>,
    pub external: ExternalPolicy,
    pub watch: bool,
    /// Config adjusters in declaration order.
    pub adjusters: Vec<ResolvedPlugin>,
    pub extract_css: ExtractCss,
    pub assets: Vec<AssetEntry>,
    pub compiler: Compiler,
    pub babel_upward_root_mode: bool,
    pub javascript_enabled: bool,
    pub generate_exports_field: bool,
    pub additional_entry_points: Vec<PathBuf>,
    pub skip_type_check: bool,
    pub skip_type_field: bool,
    pub mode: BuildMode,
}

impl NormalizedOptions {
    /// Absolute source root.
    pub fn source_root_dir(&self) -> PathBuf {
        self.workspace_root.join(&self.source_root).clean()
    }
}

/// Normalize `raw` against the workspace described by `context`.
pub async fn normalize(raw: RawOptions, context: &ExecutorContext) -> Result<NormalizedOptions> {
    dualpack_config::validate(&raw)?;
    let root = context.workspace_root.clean();

    let main = join(&root, raw.main.as_deref().unwrap_or_default());
    let entry_root = parent(&main);

    let project = match raw.project.as_deref() {
        Some(project) if !project.is_empty() => join(&root, project),
        _ => root.join("package.json"),
    };
    let project_root = parent(&project);

    let output_path = join(&root, raw.output_path.as_deref().unwrap_or_default());
    if output_path == root || !output_path.starts_with(&root) {
        return Err(Error::InvalidOutputPath(output_path.display().to_string()));
    }

    let ts_config = match raw.ts_config.as_deref() {
        Some(ts_config) => join(&root, ts_config),
        None => default_ts_config(&project_root).await,
    };

    let formats: Vec<Format> = raw
        .format
        .iter()
        .copied()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    let resolver = PluginResolver::new(&root);
    let adjusters = raw
        .rollup_config
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|specifier| !specifier.is_empty())
        .map(|specifier| resolver.resolve(&specifier))
        .collect();

    let mut assets = Vec::with_capacity(raw.assets.len());
    for asset in &raw.assets {
        assets.push(normalize_asset(asset, &root, &context.source_root).await?);
    }

    let additional_entry_points = expand_entry_points(&raw.additional_entry_points, &root)?;

    let options = NormalizedOptions {
        workspace_root: root,
        project_name: context.project_name.clone(),
        main,
        entry_root,
        project,
        project_root,
        source_root: context.source_root.clone(),
        output_path,
        output_file_name: raw.output_file_name,
        delete_output_path: raw.delete_output_path,
        ts_config,
        allow_js: raw.allow_js,
        formats,
        external: raw.external.unwrap_or_default(),
        watch: raw.watch,
        adjusters,
        extract_css: raw.extract_css,
        assets,
        compiler: raw.compiler.unwrap_or_default(),
        babel_upward_root_mode: raw.babel_upward_root_mode,
        javascript_enabled: raw.javascript_enabled,
        generate_exports_field: raw.generate_exports_field,
        additional_entry_points,
        skip_type_check: raw.skip_type_check,
        skip_type_field: raw.skip_type_field,
        mode: raw.mode.unwrap_or_default(),
    };

    tracing::debug!(
        project = %options.project_name,
        main = %options.main.display(),
        output = %options.output_path.display(),
        assets = options.assets.len(),
        adjusters = options.adjusters.len(),
        "normalized options"
    );
    Ok(options)
}

fn join(root: &Path, path: &str) -> PathBuf {
    root.join(path).clean()
}

fn parent(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// `tsconfig.lib.json` next to the manifest, else `tsconfig.json`.
async fn default_ts_config(project_root: &Path) -> PathBuf {
    let lib = project_root.join("tsconfig.lib.json");
    if tokio::fs::try_exists(&lib).await.unwrap_or(false) {
        lib
    } else {
        project_root.join("tsconfig.json")
    }
}
