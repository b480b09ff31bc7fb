//! Pipeline stages.
//!
//! A descriptor's pipeline is an ordered list of typed stages. Each stage
//! carries the options the engine needs for it, and its [`StageRole`] fixes
//! where it runs relative to the others.

use std::path::PathBuf;

use dualpack_config::ExtractCss;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Source extensions handed to resolution and the legacy compiler.
pub const SOURCE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];

/// Execution slot of a stage. Stages run in ascending role order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageRole {
    /// Asset and format-conversion stages see raw sources first.
    AssetCopy = 0,
    Media = 10,
    Json = 20,
    TypeCheck = 30,
    BundleTypes = 40,
    /// Must precede resolution so externals are never inlined.
    Externalize = 50,
    Styles = 60,
    Resolve = 70,
    Compile = 80,
    Interop = 90,
    Report = 100,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyTarget {
    pub src: String,
    pub dest: String,
}

/// Compiler options layered over the project's tsconfig.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsCompilerOverrides {
    pub root_dir: PathBuf,
    pub allow_js: bool,
    pub declaration: bool,
    pub paths: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_declaration_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCheckOptions {
    /// Report type errors; `false` only transpiles.
    pub check: bool,
    pub tsconfig: PathBuf,
    pub compiler_options: TsCompilerOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleTypesOptions {
    pub main: PathBuf,
    pub project_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesOptions {
    pub inject: bool,
    pub extract: ExtractCss,
    pub auto_modules: bool,
    pub less_javascript_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    pub prefer_builtins: bool,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BabelOptions {
    pub cwd: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_mode: Option<String>,
    pub babelrc: bool,
    pub extensions: Vec<String>,
    pub babel_helpers: String,
    pub exclude: Vec<String>,
    /// Include the async-to-promises downleveling transform.
    pub async_to_promises: bool,
}

/// One stage of a format's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PipelineStage {
    CopyAssets { targets: Vec<CopyTarget> },
    Image,
    Json,
    TypeCheck(TypeCheckOptions),
    BundleTypes(BundleTypesOptions),
    /// Marks the manifest's peer dependencies external.
    Externalize { package_json: PathBuf },
    Styles(StylesOptions),
    Resolve(ResolveOptions),
    /// Native-speed compiler.
    Swc,
    /// Legacy compiler.
    Babel(BabelOptions),
    CommonJs,
    SizeReport,
}

impl PipelineStage {
    pub fn role(&self) -> StageRole {
        match self {
            PipelineStage::CopyAssets { .. } => StageRole::AssetCopy,
            PipelineStage::Image => StageRole::Media,
            PipelineStage::Json => StageRole::Json,
            PipelineStage::TypeCheck(_) => StageRole::TypeCheck,
            PipelineStage::BundleTypes(_) => StageRole::BundleTypes,
            PipelineStage::Externalize { .. } => StageRole::Externalize,
            PipelineStage::Styles(_) => StageRole::Styles,
            PipelineStage::Resolve(_) => StageRole::Resolve,
            PipelineStage::Swc | PipelineStage::Babel(_) => StageRole::Compile,
            PipelineStage::CommonJs => StageRole::Interop,
            PipelineStage::SizeReport => StageRole::Report,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::CopyAssets { .. } => "copy-assets",
            PipelineStage::Image => "image",
            PipelineStage::Json => "json",
            PipelineStage::TypeCheck(_) => "type-check",
            PipelineStage::BundleTypes(_) => "bundle-types",
            PipelineStage::Externalize { .. } => "externalize",
            PipelineStage::Styles(_) => "styles",
            PipelineStage::Resolve(_) => "resolve",
            PipelineStage::Swc => "swc",
            PipelineStage::Babel(_) => "babel",
            PipelineStage::CommonJs => "commonjs",
            PipelineStage::SizeReport => "size-report",
        }
    }
}

/// Collects stages and yields them in role order.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: PipelineStage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn push_if(&mut self, condition: bool, stage: impl FnOnce() -> PipelineStage) -> &mut Self {
        if condition {
            self.stages.push(stage());
        }
        self
    }

    /// Stages sorted by role; the sort is stable, so equal roles keep insertion order.
    pub fn into_stages(mut self) -> Vec<PipelineStage> {
        self.stages.sort_by_key(PipelineStage::role);
        self.stages
    }
}
