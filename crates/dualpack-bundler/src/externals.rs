//! External-dependency calculation.

use dualpack_config::{ExternalKeyword, ExternalPolicy};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workspace::BuildableDependency;

/// Package names the bundle must leave as runtime imports.
///
/// Computed once per build and shared by every format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalSet(IndexSet<String>);

impl ExternalSet {
    /// Merge the manifest's `dependencies` and `peerDependencies` with the
    /// names selected by `policy`.
    pub fn compute(
        manifest: &Value,
        dependencies: &[BuildableDependency],
        npm_dependencies: &[String],
        policy: &ExternalPolicy,
    ) -> Self {
        let mut names: IndexSet<String> = ["dependencies", "peerDependencies"]
            .iter()
            .filter_map(|field| manifest.get(field).and_then(Value::as_object))
            .flat_map(|deps| deps.keys().cloned())
            .collect();

        match policy {
            ExternalPolicy::Keyword(ExternalKeyword::All) => {
                names.extend(dependencies.iter().map(|dep| dep.name.clone()));
                names.extend(npm_dependencies.iter().cloned());
            }
            ExternalPolicy::List(list) if !list.is_empty() => {
                names.extend(list.iter().cloned());
            }
            _ => {}
        }

        ExternalSet(names)
    }

    /// A specifier is external when it names a member or a sub-path of one.
    ///
    /// ```
    /// use dualpack_bundler::ExternalSet;
    ///
    /// let externals = ExternalSet::from_iter(["lodash"]);
    /// assert!(externals.is_external("lodash/debounce"));
    /// assert!(!externals.is_external("lodash-es"));
    /// ```
    pub fn is_external(&self, specifier: &str) -> bool {
        self.0.iter().any(|name| {
            specifier
                .strip_prefix(name.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExternalSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ExternalSet(iter.into_iter().map(Into::into).collect())
    }
}
