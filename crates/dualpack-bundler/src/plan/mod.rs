//! Build-plan compilation.
//!
//! Each requested format gets one [`FormatDescriptor`]: the entry map, the
//! output naming, the externalization set and an ordered, typed pipeline.
//! Compilation is pure up to the config adjusters, which run last.

mod adjust;
mod descriptor;
mod stage;
mod typescript;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dualpack_config::{Compiler, Format};
use indexmap::IndexMap;
use serde::Serialize;

use crate::externals::ExternalSet;
use crate::normalize::{AssetEntry, NormalizedOptions};
use crate::tsconfig::TsConfig;
use crate::workspace::BuildableDependency;
use crate::Result;

pub use adjust::{AdjusterLoader, AdjusterRegistry, ConfigAdjuster, FnAdjuster};
pub use descriptor::{FormatDescriptor, OutputDescriptor, class_name};
pub use stage::{
    BabelOptions, BundleTypesOptions, CopyTarget, Pipeline, PipelineStage, ResolveOptions,
    SOURCE_EXTENSIONS, StageRole, StylesOptions, TsCompilerOverrides, TypeCheckOptions,
};
pub use typescript::{compiler_overrides, dependency_paths};

/// Descriptors for every format of one build, in format order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub descriptors: Vec<FormatDescriptor>,
}

impl BuildPlan {
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.descriptors.iter().map(|descriptor| descriptor.format)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Inputs shared by every descriptor of a build.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub options: &'a NormalizedOptions,
    /// Resolved formats; never empty.
    pub formats: &'a [Format],
    pub tsconfig: &'a TsConfig,
    pub dependencies: &'a [BuildableDependency],
    pub externals: &'a Arc<ExternalSet>,
}

/// Compile every format, then hand each descriptor through the adjusters.
///
/// An adjuster failure aborts the whole plan.
pub async fn compile(inputs: PlanInputs<'_>, loader: &dyn AdjusterLoader) -> Result<BuildPlan> {
    let mut descriptors = Vec::with_capacity(inputs.formats.len());
    for &format in inputs.formats {
        let descriptor = compile_format(format, inputs);
        descriptors.push(adjust::apply_adjusters(descriptor, inputs.options, loader).await?);
    }
    Ok(BuildPlan { descriptors })
}

/// Base descriptor for `format`, before any adjuster runs.
pub fn compile_format(format: Format, inputs: PlanInputs<'_>) -> FormatDescriptor {
    let options = inputs.options;
    let should_bundle_types = inputs.formats.len() == 1 || format == Format::Cjs;

    FormatDescriptor {
        format,
        project_name: options.project_name.clone(),
        input: entry_map(options),
        output: OutputDescriptor::new(format, options.output_path.clone(), &options.project_name),
        pipeline: pipeline(format, should_bundle_types, inputs),
        externals: Arc::clone(inputs.externals),
        should_bundle_types,
        compiler: options.compiler,
        mode: options.mode,
    }
}

fn pipeline(format: Format, should_bundle_types: bool, inputs: PlanInputs<'_>) -> Vec<PipelineStage> {
    let options = inputs.options;
    let extensions: Vec<String> = SOURCE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect();

    let mut pipeline = Pipeline::new();
    pipeline
        .push(PipelineStage::CopyAssets {
            targets: copy_targets(&options.output_path, &options.assets),
        })
        .push(PipelineStage::Image)
        .push(PipelineStage::Json)
        .push_if(options.compiler == Compiler::Tsc || should_bundle_types, || {
            PipelineStage::TypeCheck(TypeCheckOptions {
                check: !options.skip_type_check,
                tsconfig: options.ts_config.clone(),
                compiler_options: compiler_overrides(options, inputs.tsconfig, inputs.dependencies),
            })
        })
        .push_if(should_bundle_types, || {
            PipelineStage::BundleTypes(BundleTypesOptions {
                main: options.main.clone(),
                project_root: options.project_root.clone(),
            })
        })
        .push(PipelineStage::Externalize {
            package_json: options.project.clone(),
        })
        .push(PipelineStage::Styles(StylesOptions {
            inject: true,
            extract: options.extract_css.clone(),
            auto_modules: true,
            less_javascript_enabled: options.javascript_enabled,
        }))
        .push(PipelineStage::Resolve(ResolveOptions {
            prefer_builtins: true,
            extensions: extensions.clone(),
        }));

    match options.compiler {
        Compiler::Swc => {
            pipeline.push(PipelineStage::Swc);
        }
        Compiler::Babel => {
            pipeline.push(PipelineStage::Babel(BabelOptions {
                cwd: options.source_root_dir(),
                root_mode: options.babel_upward_root_mode.then(|| "upward".to_string()),
                babelrc: true,
                extensions,
                babel_helpers: "bundled".to_string(),
                exclude: vec!["node_modules".to_string()],
                async_to_promises: format != Format::Esm,
            }));
        }
        // The type-check stage compiles.
        Compiler::Tsc => {}
    }

    pipeline.push(PipelineStage::CommonJs).push(PipelineStage::SizeReport);
    pipeline.into_stages()
}

/// Primary entry under its stem, then every secondary entry under its own.
///
/// Colliding stems keep the last declaration.
pub fn entry_map(options: &NormalizedOptions) -> IndexMap<String, PathBuf> {
    let primary = options
        .output_file_name
        .as_deref()
        .map(Path::new)
        .unwrap_or(&options.main);

    let mut input = IndexMap::new();
    input.insert(file_stem(primary), options.main.clone());
    for entry in &options.additional_entry_points {
        let stem = file_stem(entry);
        if let Some(previous) = input.insert(stem.clone(), entry.clone()) {
            tracing::warn!(
                entry = %stem,
                replaced = %previous.display(),
                with = %entry.display(),
                "entry points share a file name; the later one wins"
            );
        }
    }
    input
}

/// Output-relative copy rules for the asset stage.
pub fn copy_targets(output_path: &Path, assets: &[AssetEntry]) -> Vec<CopyTarget> {
    assets
        .iter()
        .map(|asset| {
            let dest = if asset.output.is_empty() {
                output_path.to_path_buf()
            } else {
                output_path.join(&asset.output)
            };
            CopyTarget {
                src: to_slash(&asset.input.join(&asset.glob)),
                dest: to_slash(&dest),
            }
        })
        .collect()
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
