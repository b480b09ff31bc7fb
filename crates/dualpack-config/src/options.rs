//! User-facing build options.
//!
//! These types mirror the `options` object of a build target in a project
//! record. Every field is optional at this layer; defaults are derived
//! during normalization.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output module convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// ECMAScript modules.
    Esm,
    /// CommonJS.
    Cjs,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Esm => "esm",
            Format::Cjs => "cjs",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esm" => Ok(Format::Esm),
            "cjs" => Ok(Format::Cjs),
            other => Err(format!("unknown format '{other}': expected 'esm' or 'cjs'")),
        }
    }
}

/// Source compiler selection. Exactly one is active per build.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    /// Legacy compiler with the async-to-promises transform for CommonJS.
    Babel,
    /// Native-speed compiler; the type checker only emits declarations.
    Swc,
    /// Type checker doubles as the compiler.
    #[default]
    Tsc,
}

impl std::str::FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "babel" => Ok(Compiler::Babel),
            "swc" => Ok(Compiler::Swc),
            "tsc" => Ok(Compiler::Tsc),
            other => Err(format!(
                "unknown compiler '{other}': expected 'babel', 'swc' or 'tsc'"
            )),
        }
    }
}

/// Build mode handed to the bundling engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Production,
    Development,
}

impl BuildMode {
    /// Value exported to the engine as `NODE_ENV`.
    pub fn as_node_env(self) -> &'static str {
        match self {
            BuildMode::Production => "production",
            BuildMode::Development => "development",
        }
    }
}

impl std::str::FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(BuildMode::Production),
            "development" | "dev" => Ok(BuildMode::Development),
            other => Err(format!("unknown build mode '{other}'")),
        }
    }
}

/// Keyword form of the externalization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKeyword {
    /// Only the manifest's own dependencies are external.
    None,
    /// Buildable and registry dependencies are external as well.
    All,
}

/// Which dependencies are left as runtime imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExternalPolicy {
    Keyword(ExternalKeyword),
    List(Vec<String>),
}

impl Default for ExternalPolicy {
    fn default() -> Self {
        ExternalPolicy::Keyword(ExternalKeyword::None)
    }
}

/// `extractCss`: either a toggle or the name of the extracted stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExtractCss {
    Enabled(bool),
    File(String),
}

impl Default for ExtractCss {
    fn default() -> Self {
        ExtractCss::Enabled(true)
    }
}

/// A single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Explicit asset copy rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetPattern {
    /// Directory to copy from, relative to the workspace root.
    pub input: String,
    /// Glob matched inside `input`.
    pub glob: String,
    /// Destination relative to the output directory.
    pub output: String,
    /// Globs excluded from the copy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

/// An asset is either a path under the source root or an explicit rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AssetOption {
    Path(String),
    Pattern(AssetPattern),
}

/// Build options as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOptions {
    /// Manifest path relative to the workspace root. Defaults to `package.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Entry file relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    /// Output directory relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Overrides the file name of the primary entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_name: Option<String>,
    /// Remove the output directory before bundling.
    pub delete_output_path: bool,
    /// tsconfig path relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_config: Option<String>,
    pub allow_js: bool,
    /// Requested formats. Empty means "infer from the tsconfig module kind".
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalPolicy>,
    pub watch: bool,
    /// Config-adjuster modules applied to each compiled descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollup_config: Option<OneOrMany<String>>,
    pub extract_css: ExtractCss,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<Compiler>,
    pub babel_upward_root_mode: bool,
    pub javascript_enabled: bool,
    pub generate_exports_field: bool,
    /// Secondary entries: file paths or globs relative to the workspace root.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_entry_points: Vec<String>,
    pub skip_type_check: bool,
    /// Leave `type` alone when only the module format is built.
    pub skip_type_field: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,
}

/// JSON schema describing [`RawOptions`].
pub fn options_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(RawOptions);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}
