use std::path::{Path, PathBuf};

use path_clean::PathClean;

use super::ManifestRewrite;
use crate::{Error, Result};

/// Write the shims, then `<output_path>/package.json`.
///
/// Nothing is written when any shim would land outside `output_path`.
pub async fn persist(rewrite: &ManifestRewrite, output_path: &Path) -> Result<PathBuf> {
    let output = output_path.clean();
    for shim in &rewrite.shims {
        if !shim.path.clean().starts_with(&output) {
            return Err(Error::InvalidOutputPath(shim.path.display().to_string()));
        }
    }

    tokio::fs::create_dir_all(&output)
        .await
        .map_err(|err| Error::io(format!("Failed to create output directory {}", output.display()), err))?;

    for shim in &rewrite.shims {
        if let Some(parent) = shim.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| Error::io(format!("Failed to create {}", parent.display()), err))?;
        }
        tokio::fs::write(&shim.path, &shim.contents)
            .await
            .map_err(|err| Error::io(format!("Failed to write shim {}", shim.path.display()), err))?;
    }

    let mut json = serde_json::to_string_pretty(&rewrite.manifest)
        .map_err(|err| Error::Configuration(format!("manifest cannot be serialized: {err}")))?;
    json.push('\n');

    // Readers see either the previous manifest or the complete new one.
    let path = output.join("package.json");
    let staged = output.join("package.json.tmp");
    tokio::fs::write(&staged, json)
        .await
        .map_err(|err| Error::io(format!("Failed to write manifest {}", staged.display()), err))?;
    if let Err(err) = tokio::fs::rename(&staged, &path).await {
        let _ = tokio::fs::remove_file(&staged).await;
        return Err(Error::io(format!("Failed to write manifest {}", path.display()), err));
    }

    tracing::debug!(
        manifest = %path.display(),
        shims = rewrite.shims.len(),
        "wrote package manifest"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ShimFile;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_manifest_and_shims() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("dist/ui");
        let rewrite = ManifestRewrite {
            manifest: json!({ "name": "@acme/ui", "main": "./index.cjs.js" }),
            shims: vec![ShimFile {
                path: output.join("index.cjs.mjs"),
                contents: "export * from './index.cjs.js';".into(),
            }],
        };

        let path = persist(&rewrite, &output).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        assert!(!output.join("package.json.tmp").exists());
        assert_eq!(serde_json::from_str::<serde_json::Value>(&written).unwrap(), rewrite.manifest);
        assert_eq!(
            std::fs::read_to_string(output.join("index.cjs.mjs")).unwrap(),
            "export * from './index.cjs.js';"
        );
    }

    #[tokio::test]
    async fn refuses_shims_outside_output() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("dist/ui");
        let rewrite = ManifestRewrite {
            manifest: json!({}),
            shims: vec![ShimFile {
                path: output.join("../escape.mjs"),
                contents: String::new(),
            }],
        };

        let err = persist(&rewrite, &output).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOutputPath(_)));
        assert!(!output.join("package.json").exists());
    }
}
