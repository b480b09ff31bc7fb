//! Type-check stage compiler overrides.

use dualpack_config::Compiler;
use indexmap::IndexMap;

use super::stage::TsCompilerOverrides;
use crate::normalize::NormalizedOptions;
use crate::tsconfig::{ModuleKind, TsConfig};
use crate::workspace::BuildableDependency;

/// Compiler options the type-check stage layers over the tsconfig.
pub fn compiler_overrides(
    options: &NormalizedOptions,
    tsconfig: &TsConfig,
    dependencies: &[BuildableDependency],
) -> TsCompilerOverrides {
    TsCompilerOverrides {
        root_dir: options.project_root.clone(),
        allow_js: options.allow_js,
        declaration: true,
        paths: dependency_paths(&tsconfig.paths, dependencies),
        module: (tsconfig.module == Some(ModuleKind::CommonJs)).then(|| "ESNext".to_string()),
        emit_declaration_only: (options.compiler == Compiler::Swc).then_some(true),
    }
}

/// Point path aliases of buildable dependencies at their build outputs.
///
/// Each dependency with outputs maps its own name to those outputs, and any
/// alias declared for one of its sub-paths is redirected into every output.
pub fn dependency_paths(
    paths: &IndexMap<String, Vec<String>>,
    dependencies: &[BuildableDependency],
) -> IndexMap<String, Vec<String>> {
    let declared: Vec<String> = paths.keys().cloned().collect();
    let mut paths = paths.clone();

    for dep in dependencies.iter().filter(|dep| !dep.outputs.is_empty()) {
        paths.insert(dep.name.clone(), dep.outputs.clone());

        let nested = format!("{}/", dep.name);
        for alias in &declared {
            if let Some(sub_path) = alias.strip_prefix(&nested) {
                let mapped = dep
                    .outputs
                    .iter()
                    .map(|output| format!("{output}/{sub_path}"))
                    .collect();
                paths.insert(alias.clone(), mapped);
            }
        }
    }
    paths
}
