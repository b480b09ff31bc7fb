//! Config-adjuster path resolution.
//!
//! Bare specifiers are first resolved like an installed package, walking
//! `node_modules` from the workspace root. Anything else, and any
//! specifier that fails to resolve, is taken as a path relative to the
//! workspace root. Resolution never fails; a missing file surfaces when the
//! adjuster is loaded.

use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveOptions, Resolver};
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

/// How a config-adjuster specifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Resolved as an installed package.
    Module,
    /// Taken as a path relative to the workspace root.
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlugin {
    /// Specifier as written in the options.
    pub specifier: String,
    pub path: PathBuf,
    pub kind: PluginKind,
}

pub struct PluginResolver {
    root: PathBuf,
    resolver: Resolver,
}

impl PluginResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let resolver = Resolver::new(ResolveOptions {
            condition_names: vec!["node".to_string(), "require".to_string()],
            extensions: vec![".js".to_string(), ".cjs".to_string(), ".json".to_string()],
            ..ResolveOptions::default()
        });
        Self {
            root: root.into(),
            resolver,
        }
    }

    pub fn resolve(&self, specifier: &str) -> ResolvedPlugin {
        if is_bare(specifier) {
            match self.resolver.resolve(&self.root, specifier) {
                Ok(resolution) => {
                    return ResolvedPlugin {
                        specifier: specifier.to_string(),
                        path: resolution.full_path(),
                        kind: PluginKind::Module,
                    };
                }
                Err(err) => {
                    tracing::debug!(specifier, error = %err, "adjuster is not an installed package");
                }
            }
        }

        ResolvedPlugin {
            specifier: specifier.to_string(),
            path: self.root.join(specifier).clean(),
            kind: PluginKind::Path,
        }
    }
}

fn is_bare(specifier: &str) -> bool {
    !(specifier.starts_with('.') || Path::new(specifier).is_absolute())
}
