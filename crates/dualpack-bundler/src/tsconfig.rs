//! tsconfig reading.
//!
//! Only the fields the build plan depends on are kept: the module kind,
//! which drives format inference, and `paths`, which is rewritten for
//! buildable dependencies. Files may contain comments and trailing commas.
//! `extends` chains are followed for relative paths and for installed
//! package bases such as `@tsconfig/node16/tsconfig.json`.

use std::path::{Path, PathBuf};

use dualpack_config::OneOrMany;
use indexmap::IndexMap;
use oxc_resolver::{ResolveOptions, Resolver};
use serde::Deserialize;

use crate::{Error, Result};

/// Maximum `extends` depth before the chain is considered cyclic.
const MAX_EXTENDS_DEPTH: usize = 16;

/// `compilerOptions.module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    None,
    CommonJs,
    Amd,
    Umd,
    System,
    Es2015,
    Es2020,
    Es2022,
    EsNext,
    Node16,
    Node18,
    NodeNext,
    Preserve,
    /// A value this reader does not know, e.g. from a newer compiler.
    Unrecognized,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 14] = [
        ModuleKind::None,
        ModuleKind::CommonJs,
        ModuleKind::Amd,
        ModuleKind::Umd,
        ModuleKind::System,
        ModuleKind::Es2015,
        ModuleKind::Es2020,
        ModuleKind::Es2022,
        ModuleKind::EsNext,
        ModuleKind::Node16,
        ModuleKind::Node18,
        ModuleKind::NodeNext,
        ModuleKind::Preserve,
        ModuleKind::Unrecognized,
    ];

    /// Case-insensitive; unknown values become [`ModuleKind::Unrecognized`].
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "none" => ModuleKind::None,
            "commonjs" => ModuleKind::CommonJs,
            "amd" => ModuleKind::Amd,
            "umd" => ModuleKind::Umd,
            "system" => ModuleKind::System,
            "es6" | "es2015" => ModuleKind::Es2015,
            "es2020" => ModuleKind::Es2020,
            "es2022" => ModuleKind::Es2022,
            "esnext" => ModuleKind::EsNext,
            "node16" => ModuleKind::Node16,
            "node18" => ModuleKind::Node18,
            "nodenext" => ModuleKind::NodeNext,
            "preserve" => ModuleKind::Preserve,
            _ => ModuleKind::Unrecognized,
        }
    }

    /// Legacy module systems whose output only CommonJS consumers can load.
    pub fn is_commonjs_like(self) -> bool {
        matches!(self, ModuleKind::CommonJs | ModuleKind::Umd | ModuleKind::Amd)
    }
}

impl std::str::FromStr for ModuleKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ModuleKind::parse(s))
    }
}

/// The parts of a resolved tsconfig that the build plan reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsConfig {
    pub path: PathBuf,
    pub module: Option<ModuleKind>,
    pub paths: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTsConfig {
    extends: Option<OneOrMany<String>>,
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCompilerOptions {
    module: Option<String>,
    paths: Option<IndexMap<String, Vec<String>>>,
}

/// Read `path` and every config it extends.
pub async fn read_tsconfig(path: &Path) -> Result<TsConfig> {
    let resolver = base_resolver();
    let mut chain = Vec::new();
    collect_chain(&resolver, path, 0, &mut chain).await?;

    // Bases first, so later entries override earlier ones.
    let mut module = None;
    let mut paths = None;
    for (file, raw) in chain.into_iter().rev() {
        if let Some(value) = raw.compiler_options.module {
            let kind = ModuleKind::parse(&value);
            if kind == ModuleKind::Unrecognized {
                tracing::warn!(
                    tsconfig = %file.display(),
                    module = %value,
                    "unrecognized compilerOptions.module, treating it as an ES module kind"
                );
            }
            module = Some(kind);
        }
        if let Some(value) = raw.compiler_options.paths {
            paths = Some(value);
        }
    }

    Ok(TsConfig {
        path: path.to_path_buf(),
        module,
        paths: paths.unwrap_or_default(),
    })
}

/// Package bases resolve like `require`, preferring a `tsconfig` field and
/// falling back to the package's `tsconfig.json`.
fn base_resolver() -> Resolver {
    Resolver::new(ResolveOptions {
        extensions: vec![".json".to_string()],
        main_fields: vec!["tsconfig".to_string()],
        main_files: vec!["tsconfig".to_string()],
        ..ResolveOptions::default()
    })
}

async fn collect_chain(
    resolver: &Resolver,
    path: &Path,
    depth: usize,
    chain: &mut Vec<(PathBuf, RawTsConfig)>,
) -> Result<()> {
    if depth > MAX_EXTENDS_DEPTH {
        return Err(Error::Configuration(format!(
            "tsconfig extends chain is too deep at {}",
            path.display()
        )));
    }

    let mut content = tokio::fs::read_to_string(path).await.map_err(|err| {
        Error::Configuration(format!("cannot read tsconfig {}: {err}", path.display()))
    })?;
    json_strip_comments::strip(&mut content).map_err(|err| {
        Error::Configuration(format!("malformed tsconfig {}: {err}", path.display()))
    })?;
    let raw: RawTsConfig = serde_json::from_str(&content).map_err(|err| {
        Error::Configuration(format!("malformed tsconfig {}: {err}", path.display()))
    })?;

    let parents = raw.extends.clone().map(OneOrMany::into_vec).unwrap_or_default();
    chain.push((path.to_path_buf(), raw));

    let dir = path.parent().unwrap_or(Path::new("."));
    // Later entries of an `extends` array take precedence, so walk them in reverse.
    for parent in parents.iter().rev() {
        let parent_path = resolve_extends(resolver, dir, parent).ok_or_else(|| {
            Error::Configuration(format!(
                "{}: cannot resolve extended tsconfig '{parent}'",
                path.display()
            ))
        })?;
        Box::pin(collect_chain(resolver, &parent_path, depth + 1, chain)).await?;
    }
    Ok(())
}

fn resolve_extends(resolver: &Resolver, dir: &Path, specifier: &str) -> Option<PathBuf> {
    let is_relative = specifier.starts_with("./") || specifier.starts_with("../");
    if is_relative || Path::new(specifier).is_absolute() {
        let candidate = dir.join(specifier);
        if candidate.extension().is_none() || !candidate.is_file() {
            let with_ext = PathBuf::from(format!("{}.json", candidate.display()));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
        return Some(candidate);
    }

    match resolver.resolve(dir, specifier) {
        Ok(resolution) => Some(resolution.full_path()),
        Err(err) => {
            tracing::debug!(extends = specifier, error = %err, "tsconfig base did not resolve");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn module_kind_parses_case_insensitively() {
        assert_eq!(ModuleKind::parse("CommonJS"), ModuleKind::CommonJs);
        assert_eq!(ModuleKind::parse("ES6"), ModuleKind::Es2015);
        assert_eq!("NodeNext".parse::<ModuleKind>().unwrap(), ModuleKind::NodeNext);
        assert_eq!(ModuleKind::parse("commonjs2"), ModuleKind::Unrecognized);
    }

    #[tokio::test]
    async fn follows_relative_extends() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("tsconfig.base.json"),
            r#"{ "compilerOptions": { "module": "commonjs", "paths": { "@acme/ui": ["libs/ui/src/index.ts"] } } }"#,
        )
        .unwrap();
        let lib = temp.path().join("libs/ui");
        fs::create_dir_all(&lib).unwrap();
        fs::write(
            lib.join("tsconfig.lib.json"),
            r#"{
                // inherits paths
                "extends": "../../tsconfig.base",
                "compilerOptions": { "module": "esnext", },
            }"#,
        )
        .unwrap();

        let config = read_tsconfig(&lib.join("tsconfig.lib.json")).await.unwrap();
        assert_eq!(config.module, Some(ModuleKind::EsNext));
        assert_eq!(config.paths["@acme/ui"], vec!["libs/ui/src/index.ts"]);
    }

    #[tokio::test]
    async fn unknown_module_kind_is_kept_as_unrecognized() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tsconfig.json");
        fs::write(&path, r#"{ "compilerOptions": { "module": "node20" } }"#).unwrap();

        let config = read_tsconfig(&path).await.unwrap();
        assert_eq!(config.module, Some(ModuleKind::Unrecognized));
        assert!(!ModuleKind::Unrecognized.is_commonjs_like());
    }

    #[tokio::test]
    async fn follows_package_extends_from_node_modules() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("node_modules/@tsconfig/node16");
        fs::create_dir_all(&base).unwrap();
        fs::write(base.join("package.json"), r#"{ "name": "@tsconfig/node16" }"#).unwrap();
        fs::write(
            base.join("tsconfig.json"),
            r#"{
                // shared base
                "compilerOptions": { "module": "commonjs", },
            }"#,
        )
        .unwrap();
        let lib = temp.path().join("libs/ui");
        fs::create_dir_all(&lib).unwrap();
        fs::write(
            lib.join("tsconfig.json"),
            r#"{ "extends": "@tsconfig/node16/tsconfig.json" }"#,
        )
        .unwrap();
        fs::write(
            lib.join("tsconfig.lib.json"),
            r#"{ "extends": "@tsconfig/node16", "compilerOptions": { "paths": {} } }"#,
        )
        .unwrap();

        let config = read_tsconfig(&lib.join("tsconfig.json")).await.unwrap();
        assert_eq!(config.module, Some(ModuleKind::CommonJs));

        let config = read_tsconfig(&lib.join("tsconfig.lib.json")).await.unwrap();
        assert_eq!(config.module, Some(ModuleKind::CommonJs));
    }

    #[tokio::test]
    async fn unresolvable_package_base_is_a_configuration_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tsconfig.json");
        fs::write(&path, r#"{ "extends": "@tsconfig/missing/tsconfig.json" }"#).unwrap();

        let err = read_tsconfig(&path).await.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("@tsconfig/missing"));
    }

    #[tokio::test]
    async fn malformed_file_is_a_configuration_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tsconfig.json");
        fs::write(&path, "{ \"compilerOptions\": ").unwrap();

        let err = read_tsconfig(&path).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn missing_module_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tsconfig.json");
        fs::write(&path, "{}").unwrap();

        let config = read_tsconfig(&path).await.unwrap();
        assert_eq!(config.module, None);
        assert!(config.paths.is_empty());
    }
}
