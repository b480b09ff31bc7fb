//! Shared fixtures for dualpack-bundler integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dualpack_bundler::{
    Artifact, BundleEngine, BundleOutput, EngineError, ExecutorContext, Format, FormatDescriptor,
};
use dualpack_config::{ProjectConfig, RawOptions};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A one-project workspace: `libs/ui` with sources under `libs/ui/src`.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(module: &str) -> Self {
        Self::with_manifest(
            module,
            json!({
                "name": "@acme/ui",
                "version": "1.0.0",
                "peerDependencies": { "react": "^18.0.0" }
            }),
        )
    }

    pub fn with_manifest(module: &str, manifest: Value) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let workspace = Self { dir };
        workspace.write("libs/ui/src/index.ts", "export const ui = 1;\n");
        workspace.write(
            "libs/ui/package.json",
            &serde_json::to_string_pretty(&manifest).expect("manifest json"),
        );
        workspace.write(
            "libs/ui/tsconfig.json",
            &format!(
                "{{\n  // library build\n  \"compilerOptions\": {{ \"module\": \"{module}\", }},\n}}\n"
            ),
        );
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write fixture");
    }

    pub fn context(&self) -> ExecutorContext {
        let project = ProjectConfig {
            name: "ui".into(),
            root: Some("libs/ui".into()),
            source_root: Some("libs/ui/src".into()),
            ..ProjectConfig::default()
        };
        ExecutorContext::new(self.root(), &project, "build")
    }

    pub fn raw(&self) -> RawOptions {
        RawOptions {
            main: Some("libs/ui/src/index.ts".into()),
            output_path: Some("dist/libs/ui".into()),
            project: Some("libs/ui/package.json".into()),
            ..RawOptions::default()
        }
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("dist/libs/ui")
    }

    pub fn output_manifest(&self) -> Option<Value> {
        let content = fs::read_to_string(self.output().join("package.json")).ok()?;
        Some(serde_json::from_str(&content).expect("output manifest json"))
    }
}

/// Engine that records every call and fails the formats it is told to.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Format>>,
    failing: Mutex<Vec<Format>>,
}

impl RecordingEngine {
    pub fn failing(formats: &[Format]) -> Self {
        let engine = Self::default();
        engine.set_failing(formats);
        engine
    }

    pub fn set_failing(&self, formats: &[Format]) {
        *self.failing.lock() = formats.to_vec();
    }

    pub fn calls(&self) -> Vec<Format> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl BundleEngine for RecordingEngine {
    async fn bundle(&self, descriptor: &FormatDescriptor) -> Result<BundleOutput, EngineError> {
        self.calls.lock().push(descriptor.format);
        if self.failing.lock().contains(&descriptor.format) {
            return Err(EngineError::new(format!(
                "{}: Unexpected token",
                descriptor.format
            )));
        }
        let artifacts = descriptor
            .input
            .keys()
            .map(|name| Artifact {
                file_name: format!("{name}.{}.js", descriptor.format),
                size: 1200,
            })
            .collect();
        Ok(BundleOutput { artifacts })
    }
}
