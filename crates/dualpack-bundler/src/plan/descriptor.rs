use std::path::PathBuf;
use std::sync::Arc;

use dualpack_config::{BuildMode, Compiler, Format};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::stage::PipelineStage;
use crate::externals::ExternalSet;

/// Output half of a format descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDescriptor {
    pub format: Format,
    pub dir: PathBuf,
    /// Global name for formats that need one.
    pub name: String,
    pub entry_file_names: String,
    pub chunk_file_names: String,
}

impl OutputDescriptor {
    pub fn new(format: Format, dir: PathBuf, project_name: &str) -> Self {
        let pattern = format!("[name].{format}.js");
        Self {
            format,
            dir,
            name: class_name(project_name),
            entry_file_names: pattern.clone(),
            chunk_file_names: pattern,
        }
    }
}

/// Everything the engine needs to build one output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    pub format: Format,
    pub project_name: String,
    /// Entry chunk name to source file.
    pub input: IndexMap<String, PathBuf>,
    pub output: OutputDescriptor,
    pub pipeline: Vec<PipelineStage>,
    /// Shared by every descriptor of a build.
    #[serde(rename = "external")]
    pub externals: Arc<ExternalSet>,
    pub should_bundle_types: bool,
    pub compiler: Compiler,
    pub mode: BuildMode,
}

impl FormatDescriptor {
    /// Whether the engine must leave `specifier` as a runtime import.
    pub fn is_external(&self, specifier: &str) -> bool {
        self.externals.is_external(specifier)
    }

    pub fn stage(&self, name: &str) -> Option<&PipelineStage> {
        self.pipeline.iter().find(|stage| stage.name() == name)
    }
}

/// `ClassName` form of a project name: separators dropped, each word capitalized.
///
/// ```
/// use dualpack_bundler::plan::class_name;
///
/// assert_eq!(class_name("ui-kit"), "UiKit");
/// assert_eq!(class_name("@acme/data_grid"), "AcmeDataGrid");
/// ```
pub fn class_name(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
