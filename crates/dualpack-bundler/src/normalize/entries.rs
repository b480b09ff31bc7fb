//! Secondary entry-point expansion.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::{Error, Result};

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// Expand entry patterns relative to `root`.
///
/// Literal paths are kept even when the file does not exist yet; patterns
/// expand to the matching files, sorted.
pub fn expand_entry_points(patterns: &[String], root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for pattern in patterns {
        if pattern.contains(GLOB_CHARS) {
            entries.extend(expand_glob(pattern, root)?);
        } else {
            entries.push(root.join(pattern));
        }
    }
    Ok(entries)
}

fn expand_glob(pattern: &str, root: &Path) -> Result<Vec<PathBuf>> {
    let matcher: GlobMatcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|err| Error::Configuration(format!("invalid entry point glob '{pattern}': {err}")))?
        .compile_matcher();

    let base = root.join(literal_prefix(pattern));
    let mut matches: Vec<PathBuf> = WalkDir::new(&base)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .is_ok_and(|relative| matcher.is_match(relative))
        })
        .map(|entry| entry.into_path())
        .collect();
    matches.sort();

    if matches.is_empty() {
        tracing::warn!(pattern, "entry point pattern matched no files");
    }
    Ok(matches)
}

/// Leading directories of `pattern` that contain no glob characters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let mut segments = pattern.split('/').peekable();
    while let Some(segment) = segments.next() {
        // The last segment names files, never a directory to descend into.
        if segments.peek().is_none() || segment.contains(GLOB_CHARS) {
            break;
        }
        prefix.push(segment);
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn literal_entries_pass_through() {
        let temp = TempDir::new().unwrap();
        let entries =
            expand_entry_points(&["libs/ui/src/button.ts".to_string()], temp.path()).unwrap();
        assert_eq!(entries, vec![temp.path().join("libs/ui/src/button.ts")]);
    }

    #[test]
    fn globs_expand_sorted_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("libs/ui/src/entries");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("tabs.ts"), "").unwrap();
        fs::write(src.join("button.ts"), "").unwrap();
        fs::write(src.join("notes.md"), "").unwrap();

        let entries =
            expand_entry_points(&["libs/ui/src/entries/*.ts".to_string()], temp.path()).unwrap();
        assert_eq!(entries, vec![src.join("button.ts"), src.join("tabs.ts")]);
    }

    #[test]
    fn literal_prefix_stops_at_glob() {
        assert_eq!(literal_prefix("libs/ui/src/**/*.ts"), PathBuf::from("libs/ui/src"));
        assert_eq!(literal_prefix("*.ts"), PathBuf::new());
    }

    #[test]
    fn invalid_glob_is_a_configuration_error() {
        let temp = TempDir::new().unwrap();
        let err = expand_entry_points(&["libs/[ui".to_string()], temp.path()).unwrap_err();
        assert!(err.is_configuration());
    }
}
