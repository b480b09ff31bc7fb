//! A prepared build: everything computed once per invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dualpack_config::{Format, RawOptions};
use serde_json::Value;

use crate::externals::ExternalSet;
use crate::formats::resolve_formats;
use crate::normalize::{NormalizedOptions, normalize};
use crate::plan::{self, AdjusterLoader, BuildPlan, PlanInputs};
use crate::tsconfig::{TsConfig, read_tsconfig};
use crate::workspace::{BuildableDependency, ExecutorContext};
use crate::{Error, Result};

/// Immutable inputs shared by the plan compiler, the driver and the
/// manifest rewriter.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub options: Arc<NormalizedOptions>,
    /// Requested formats, or the one inferred from the tsconfig.
    pub formats: Vec<Format>,
    pub tsconfig: TsConfig,
    /// The project's manifest as read before the build.
    pub manifest: Arc<Value>,
    pub externals: Arc<ExternalSet>,
    pub dependencies: Vec<BuildableDependency>,
}

impl BuildRequest {
    /// Normalize `raw`, then read the manifest and tsconfig it points at.
    ///
    /// Every configuration error surfaces here, before any engine runs.
    pub async fn prepare(raw: RawOptions, context: &ExecutorContext) -> Result<Self> {
        let options = normalize(raw, context).await?;
        let manifest = read_manifest(&options.project).await?;
        let tsconfig = read_tsconfig(&options.ts_config).await?;
        let formats = resolve_formats(&options.formats, &tsconfig);

        let externals = ExternalSet::compute(
            &manifest,
            &context.dependencies,
            &context.npm_dependencies,
            &options.external,
        );
        tracing::debug!(
            project = %options.project_name,
            formats = ?formats,
            externals = externals.len(),
            "prepared build"
        );

        Ok(Self {
            options: Arc::new(options),
            formats,
            tsconfig,
            manifest: Arc::new(manifest),
            externals: Arc::new(externals),
            dependencies: context.dependencies.clone(),
        })
    }

    pub async fn compile(&self, loader: &dyn AdjusterLoader) -> Result<BuildPlan> {
        plan::compile(self.plan_inputs(), loader).await
    }

    pub fn plan_inputs(&self) -> PlanInputs<'_> {
        PlanInputs {
            options: &self.options,
            formats: &self.formats,
            tsconfig: &self.tsconfig,
            dependencies: &self.dependencies,
            externals: &self.externals,
        }
    }

    pub fn has_format(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }

    /// The CommonJS primary artifact, when `cjs` is built.
    pub fn outfile(&self) -> Option<PathBuf> {
        if !self.has_format(Format::Cjs) {
            return None;
        }
        let stem = match &self.options.output_file_name {
            Some(name) => plan::file_stem(Path::new(name)),
            None => plan::file_stem(&self.options.main),
        };
        Some(self.options.output_path.join(format!("{stem}.cjs.js")))
    }
}

async fn read_manifest(path: &Path) -> Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| Error::io(format!("Failed to read manifest {}", path.display()), err))?;
    serde_json::from_str(&content)
        .map_err(|err| Error::Configuration(format!("malformed manifest {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualpack_config::ProjectConfig;
    use std::fs;
    use tempfile::TempDir;

    fn workspace(module: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("libs/ui");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::write(
            project.join("package.json"),
            r#"{ "name": "@acme/ui", "peerDependencies": { "react": "^18.0.0" } }"#,
        )
        .unwrap();
        fs::write(
            project.join("tsconfig.json"),
            format!(r#"{{ "compilerOptions": {{ "module": "{module}" }} }}"#),
        )
        .unwrap();
        temp
    }

    fn context(root: &std::path::Path) -> ExecutorContext {
        let project = ProjectConfig {
            name: "ui".into(),
            root: Some("libs/ui".into()),
            source_root: Some("libs/ui/src".into()),
            ..ProjectConfig::default()
        };
        ExecutorContext::new(root, &project, "build")
    }

    fn raw() -> RawOptions {
        RawOptions {
            main: Some("libs/ui/src/index.ts".into()),
            output_path: Some("dist/libs/ui".into()),
            project: Some("libs/ui/package.json".into()),
            ..RawOptions::default()
        }
    }

    #[tokio::test]
    async fn commonjs_tsconfig_infers_cjs() {
        let temp = workspace("CommonJS");
        let request = BuildRequest::prepare(raw(), &context(temp.path())).await.unwrap();

        assert_eq!(request.formats, vec![Format::Cjs]);
        assert!(request.externals.contains("react"));
        assert_eq!(
            request.outfile(),
            Some(temp.path().join("dist/libs/ui/index.cjs.js"))
        );
    }

    #[tokio::test]
    async fn esm_build_has_no_outfile() {
        let temp = workspace("ESNext");
        let request = BuildRequest::prepare(raw(), &context(temp.path())).await.unwrap();
        assert_eq!(request.formats, vec![Format::Esm]);
        assert_eq!(request.outfile(), None);
    }

    #[tokio::test]
    async fn unrecognized_module_kind_infers_esm() {
        let temp = workspace("node20");
        let request = BuildRequest::prepare(raw(), &context(temp.path())).await.unwrap();
        assert_eq!(request.formats, vec![Format::Esm]);
    }

    #[tokio::test]
    async fn package_tsconfig_base_drives_inference() {
        let temp = workspace("ESNext");
        let base = temp.path().join("node_modules/@tsconfig/node16");
        fs::create_dir_all(&base).unwrap();
        fs::write(base.join("tsconfig.json"), r#"{ "compilerOptions": { "module": "commonjs" } }"#).unwrap();
        fs::write(
            temp.path().join("libs/ui/tsconfig.json"),
            r#"{ "extends": "@tsconfig/node16/tsconfig.json" }"#,
        )
        .unwrap();

        let request = BuildRequest::prepare(raw(), &context(temp.path())).await.unwrap();
        assert_eq!(request.formats, vec![Format::Cjs]);
    }

    #[tokio::test]
    async fn missing_manifest_is_an_io_error() {
        let temp = workspace("ESNext");
        let err = BuildRequest::prepare(
            RawOptions {
                project: Some("libs/missing/package.json".into()),
                ..raw()
            },
            &context(temp.path()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
    }

    #[tokio::test]
    async fn compiles_one_descriptor_per_format() {
        let temp = workspace("ESNext");
        let request = BuildRequest::prepare(
            RawOptions {
                format: vec![Format::Esm, Format::Cjs],
                ..raw()
            },
            &context(temp.path()),
        )
        .await
        .unwrap();

        let plan = request.compile(&plan::AdjusterRegistry::default()).await.unwrap();
        assert_eq!(plan.formats().collect::<Vec<_>>(), vec![Format::Esm, Format::Cjs]);
        assert_eq!(
            plan.descriptors.iter().filter(|d| d.should_bundle_types).count(),
            1
        );
    }
}
