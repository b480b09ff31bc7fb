//! Asset option normalization.

use std::path::{Component, Path, PathBuf};

use dualpack_config::{AssetOption, AssetPattern};
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Glob used for directory assets.
const MATCH_ALL: &str = "**/*";

/// A normalized copy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    /// Absolute directory to copy from.
    pub input: PathBuf,
    /// Glob matched inside `input`.
    pub glob: String,
    /// Destination relative to the output directory, lexically cleaned.
    /// Never starts with `..`.
    pub output: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

/// Convert one asset option into a copy rule.
///
/// `source_root` is relative to `root`. String assets must live under it;
/// explicit rules must not write above the output directory.
pub async fn normalize_asset(
    asset: &AssetOption,
    root: &Path,
    source_root: &str,
) -> Result<AssetEntry> {
    match asset {
        AssetOption::Path(path) => normalize_path_asset(path, root, source_root).await,
        AssetOption::Pattern(pattern) => normalize_pattern_asset(pattern, root),
    }
}

async fn normalize_path_asset(asset: &str, root: &Path, source_root: &str) -> Result<AssetEntry> {
    let resolved = root.join(to_unix(asset)).clean();
    let resolved_source_root = root.join(source_root).clean();

    if !resolved.starts_with(&resolved_source_root) {
        return Err(Error::Configuration(format!(
            "The {} asset path must start with the project source root: {source_root}",
            resolved.display()
        )));
    }

    let metadata = tokio::fs::metadata(&resolved).await.map_err(|err| {
        Error::Configuration(format!("asset {} cannot be read: {err}", resolved.display()))
    })?;

    let (input, glob) = if metadata.is_dir() {
        (resolved.clone(), MATCH_ALL.to_string())
    } else {
        let name = resolved
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
        (dir, name)
    };

    let output = input
        .strip_prefix(&resolved_source_root)
        .map(|relative| to_unix(&relative.to_string_lossy()))
        .unwrap_or_default();

    Ok(AssetEntry {
        input,
        glob,
        output,
        ignore: Vec::new(),
    })
}

fn normalize_pattern_asset(pattern: &AssetPattern, root: &Path) -> Result<AssetEntry> {
    let output = to_unix(&pattern.output);
    let output = PathBuf::from(output.trim_start_matches('/')).clean();
    if matches!(output.components().next(), Some(Component::ParentDir)) {
        return Err(Error::Configuration(
            "An asset cannot be written to a location outside of the output path.".to_string(),
        ));
    }

    let output = to_unix(&output.to_string_lossy());
    Ok(AssetEntry {
        input: root.join(to_unix(&pattern.input)).clean(),
        glob: pattern.glob.clone(),
        output: if output == "." { String::new() } else { output },
        ignore: pattern.ignore.clone(),
    })
}

fn to_unix(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("libs/ui/src");
        fs::create_dir_all(src.join("assets/icons")).unwrap();
        fs::write(src.join("logo.png"), b"png").unwrap();
        fs::write(src.join("assets/icons/check.svg"), b"<svg/>").unwrap();
        temp
    }

    #[tokio::test]
    async fn file_asset_copies_its_own_name() {
        let temp = workspace();
        let entry = normalize_asset(
            &AssetOption::Path("libs/ui/src/logo.png".into()),
            temp.path(),
            "libs/ui/src",
        )
        .await
        .unwrap();

        assert_eq!(entry.input, temp.path().join("libs/ui/src"));
        assert_eq!(entry.glob, "logo.png");
        assert_eq!(entry.output, "");
    }

    #[tokio::test]
    async fn directory_asset_matches_everything() {
        let temp = workspace();
        let entry = normalize_asset(
            &AssetOption::Path("libs/ui/src/assets".into()),
            temp.path(),
            "libs/ui/src",
        )
        .await
        .unwrap();

        assert_eq!(entry.input, temp.path().join("libs/ui/src/assets"));
        assert_eq!(entry.glob, "**/*");
        assert_eq!(entry.output, "assets");
    }

    #[tokio::test]
    async fn asset_outside_source_root_is_rejected() {
        let temp = workspace();
        fs::write(temp.path().join("README.md"), "readme").unwrap();

        let err = normalize_asset(&AssetOption::Path("README.md".into()), temp.path(), "libs/ui/src")
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("must start with the project source root: libs/ui/src"));
    }

    #[tokio::test]
    async fn sibling_with_common_prefix_is_outside() {
        let temp = workspace();
        fs::create_dir_all(temp.path().join("libs/ui/src2")).unwrap();

        let err = normalize_asset(&AssetOption::Path("libs/ui/src2".into()), temp.path(), "libs/ui/src")
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn pattern_output_cannot_escape() {
        let temp = workspace();
        for output in ["../outside", "/../escape", "docs/../../escape", "..\\outside"] {
            let asset = AssetOption::Pattern(AssetPattern {
                input: "libs/ui".into(),
                glob: "*.md".into(),
                output: output.into(),
                ignore: vec![],
            });

            let err = normalize_asset(&asset, temp.path(), "libs/ui/src").await.unwrap_err();
            assert!(err.is_configuration(), "{output}");
            assert!(err.to_string().contains("outside of the output path"), "{output}");
        }
    }

    #[tokio::test]
    async fn pattern_output_is_cleaned() {
        let temp = workspace();
        for (output, expected) in [("docs/../media/./img", "media/img"), ("/", ""), ("./", "")] {
            let asset = AssetOption::Pattern(AssetPattern {
                input: "libs/ui".into(),
                glob: "*.png".into(),
                output: output.into(),
                ignore: vec![],
            });

            let entry = normalize_asset(&asset, temp.path(), "libs/ui/src").await.unwrap();
            assert_eq!(entry.output, expected, "{output}");
        }
    }

    #[tokio::test]
    async fn pattern_output_leading_slash_is_stripped() {
        let temp = workspace();
        let asset = AssetOption::Pattern(AssetPattern {
            input: "libs/ui/".into(),
            glob: "*.md".into(),
            output: "/docs".into(),
            ignore: vec!["CHANGELOG.md".into()],
        });

        let entry = normalize_asset(&asset, temp.path(), "libs/ui/src").await.unwrap();
        assert_eq!(entry.input, temp.path().join("libs/ui"));
        assert_eq!(entry.output, "docs");
        assert_eq!(entry.ignore, vec!["CHANGELOG.md"]);
    }
}
