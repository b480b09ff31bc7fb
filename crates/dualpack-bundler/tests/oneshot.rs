//! One-shot failure semantics.

mod helpers;

use dualpack_bundler::{AdjusterRegistry, BuildRequest, Format, driver};
use dualpack_config::RawOptions;
use helpers::{RecordingEngine, Workspace};

async fn dual_request(workspace: &Workspace) -> BuildRequest {
    let raw = RawOptions {
        format: vec![Format::Esm, Format::Cjs],
        generate_exports_field: true,
        ..workspace.raw()
    };
    BuildRequest::prepare(raw, &workspace.context()).await.unwrap()
}

#[tokio::test]
async fn early_failure_still_runs_later_formats() {
    let workspace = Workspace::new("ESNext");
    let request = dual_request(&workspace).await;
    let plan = request.compile(&AdjusterRegistry::default()).await.unwrap();

    let engine = RecordingEngine::failing(&[Format::Esm]);
    let report = driver::run_once(&request, &plan, &engine).await.unwrap();

    assert_eq!(engine.calls(), vec![Format::Esm, Format::Cjs]);
    assert!(!report.result.success);
    assert_eq!(report.result.outfile, None);
    assert_eq!(report.manifest, None);
    assert!(workspace.output_manifest().is_none());
}

#[tokio::test]
async fn late_failure_poisons_the_result() {
    let workspace = Workspace::new("ESNext");
    let request = dual_request(&workspace).await;
    let plan = request.compile(&AdjusterRegistry::default()).await.unwrap();

    let engine = RecordingEngine::failing(&[Format::Cjs]);
    let report = driver::run_once(&request, &plan, &engine).await.unwrap();

    assert!(!report.result.success);
    assert!(workspace.output_manifest().is_none());
    assert!(!workspace.output().join("index.cjs.mjs").exists());
    // Artifacts of the format that built are still reported.
    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].file_name, "index.esm.js");
}

#[tokio::test]
async fn success_writes_manifest_and_shims() {
    let workspace = Workspace::new("ESNext");
    let request = dual_request(&workspace).await;
    let plan = request.compile(&AdjusterRegistry::default()).await.unwrap();

    let report = driver::run_once(&request, &plan, &RecordingEngine::default())
        .await
        .unwrap();

    assert!(report.result.success);
    assert_eq!(report.manifest, Some(workspace.output().join("package.json")));
    let shim = std::fs::read_to_string(workspace.output().join("index.cjs.mjs")).unwrap();
    assert!(shim.contains("export * from './index.cjs.js';"));
    assert!(shim.contains("export { _default as default } from './index.cjs.default.js';"));
    let carrier =
        std::fs::read_to_string(workspace.output().join("index.cjs.default.js")).unwrap();
    assert_eq!(carrier, "exports._default = require('./index.cjs.js').default;");
}

#[tokio::test]
async fn rebuilding_keeps_exports_stable() {
    let workspace = Workspace::new("ESNext");
    let request = dual_request(&workspace).await;
    let plan = request.compile(&AdjusterRegistry::default()).await.unwrap();
    let engine = RecordingEngine::default();

    driver::run_once(&request, &plan, &engine).await.unwrap();
    let first = std::fs::read_to_string(workspace.output().join("package.json")).unwrap();
    driver::run_once(&request, &plan, &engine).await.unwrap();
    let second = std::fs::read_to_string(workspace.output().join("package.json")).unwrap();

    assert_eq!(first, second);
}
