use std::time::Instant;

use super::report::{format_duration, log_artifacts};
use super::{BuildReport, BuildResult};
use crate::engine::BundleEngine;
use crate::fs::delete_output_dir;
use crate::manifest;
use crate::plan::BuildPlan;
use crate::request::BuildRequest;
use crate::Result;

/// Build every descriptor of `plan`, strictly in order.
///
/// A failing format is logged and poisons the result, but later formats
/// still run. The manifest is rewritten only when every format succeeded.
/// Engine failures never surface as `Err`; I/O failures around the build do.
pub async fn run_once<E>(request: &BuildRequest, plan: &BuildPlan, engine: &E) -> Result<BuildReport>
where
    E: BundleEngine + ?Sized,
{
    let options = &request.options;
    if options.delete_output_path {
        delete_output_dir(&options.workspace_root, &options.output_path).await?;
    }

    tracing::info!(project = %options.project_name, "Bundling {}...", options.project_name);
    let start = Instant::now();

    let mut result = BuildResult::succeeded(request.outfile());
    let mut artifacts = Vec::new();
    for descriptor in &plan.descriptors {
        match engine.bundle(descriptor).await {
            Ok(output) => {
                tracing::debug!(format = %descriptor.format, artifacts = output.artifacts.len(), "format built");
                log_artifacts(&output);
                artifacts.extend(output.artifacts);
            }
            Err(err) => {
                tracing::error!(format = %descriptor.format, "Error during bundle: {err}");
                result = BuildResult::failed();
            }
        }
    }

    let mut manifest_path = None;
    if result.success {
        let rewrite = manifest::rewrite(&request.manifest, options, &request.formats)?;
        manifest_path = Some(manifest::persist(&rewrite, &options.output_path).await?);
        tracing::info!("⚡ Done in {}", format_duration(start.elapsed()));
    } else {
        tracing::error!(project = %options.project_name, "Bundle failed: {}", options.project_name);
    }

    Ok(BuildReport {
        result,
        elapsed: start.elapsed(),
        artifacts,
        manifest: manifest_path,
    })
}
