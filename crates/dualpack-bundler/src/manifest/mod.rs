//! Package manifest rewriting.
//!
//! After a successful build the manifest's entry fields are pointed at the
//! emitted files so that CommonJS and module consumers both resolve the
//! right artifact. When both formats are built, `import` of a CommonJS
//! entry goes through a small module shim that re-exports the CommonJS
//! file, so both module systems share one instance of the package.
//!
//! [`rewrite`] is pure; [`persist`] writes its result.

mod exports;
mod write;

use std::path::{Path, PathBuf};

use dualpack_config::Format;
use serde_json::{Map, Value};

use crate::normalize::NormalizedOptions;
use crate::{Error, Result};

pub use exports::{CJS_EXT, ESM_EXT, get_exports};
pub use write::persist;

/// A file synthesized next to the CommonJS output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimFile {
    /// Absolute path inside the output directory.
    pub path: PathBuf,
    pub contents: String,
}

/// The rewritten manifest plus the shims it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRewrite {
    pub manifest: Value,
    pub shims: Vec<ShimFile>,
}

/// Patch `manifest` for the built `formats`.
pub fn rewrite(
    manifest: &Value,
    options: &NormalizedOptions,
    formats: &[Format],
) -> Result<ManifestRewrite> {
    let Value::Object(fields) = manifest else {
        return Err(Error::Configuration(format!(
            "manifest {} is not a JSON object",
            options.project.display()
        )));
    };

    let mut patch = Patch {
        fields: fields.clone(),
        exports: Map::new(),
        shims: Vec::new(),
        options,
        has_esm: formats.contains(&Format::Esm),
        has_cjs: formats.contains(&Format::Cjs),
    };

    if options.generate_exports_field {
        patch.reset_exports();
    }
    if patch.has_esm {
        patch.apply_esm();
    }
    if patch.has_cjs {
        patch.apply_cjs();
    }
    if options.generate_exports_field {
        patch
            .fields
            .insert("exports".into(), Value::Object(patch.exports));
    }

    Ok(ManifestRewrite {
        manifest: Value::Object(patch.fields),
        shims: patch.shims,
    })
}

struct Patch<'a> {
    fields: Map<String, Value>,
    /// Working copy of `exports`, written back when generation is on.
    exports: Map<String, Value>,
    shims: Vec<ShimFile>,
    options: &'a NormalizedOptions,
    has_esm: bool,
    has_cjs: bool,
}

impl Patch<'_> {
    /// An object `exports` is kept; anything else starts over.
    fn reset_exports(&mut self) {
        self.exports = match self.fields.get("exports") {
            Some(Value::Object(exports)) => exports.clone(),
            _ => Map::new(),
        };
        self.exports
            .insert("./package.json".into(), "./package.json".into());
        // Reserve the key's position; the final map is written at the end.
        self.fields.insert("exports".into(), Value::Null);
    }

    fn apply_esm(&mut self) {
        let esm = get_exports(self.options, ESM_EXT);
        let entry = esm["."].clone();
        self.fields.insert("module".into(), entry.clone().into());

        if !self.has_cjs {
            if !self.options.skip_type_field {
                self.fields.insert("type".into(), "module".into());
            }
            self.fields.entry("main").or_insert_with(|| entry.into());
        }

        if self.options.generate_exports_field {
            for (key, path) in esm {
                // With CommonJS present, `import` is routed through the shim;
                // bundlers still get the module file for tree-shaking.
                let value = if self.has_cjs {
                    Value::Object(Map::from_iter([("module".to_string(), Value::from(path))]))
                } else {
                    Value::from(path)
                };
                self.exports.insert(key, value);
            }
        }
    }

    fn apply_cjs(&mut self) {
        let cjs = get_exports(self.options, CJS_EXT);
        self.fields.insert("main".into(), cjs["."].clone().into());

        if !self.has_esm {
            self.fields.insert("type".into(), "commonjs".into());
        }

        if self.options.generate_exports_field {
            for (key, path) in cjs {
                self.apply_cjs_entry(key, path);
            }
        }
    }

    fn apply_cjs_entry(&mut self, key: String, path: String) {
        if !self.has_esm {
            self.exports.insert(key, path.into());
            return;
        }

        let stem = path.strip_suffix(CJS_EXT).unwrap_or(&path).to_string();
        let shim = format!("{stem}.cjs.mjs");
        let default_carrier = format!("{stem}.cjs.default.js");

        let conditions = self
            .exports
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !conditions.is_object() {
            *conditions = Value::Object(Map::new());
        }
        if let Value::Object(conditions) = conditions {
            conditions
                .entry("import")
                .or_insert_with(|| shim.clone().into());
            conditions
                .entry("default")
                .or_insert_with(|| path.clone().into());
        }

        let base = file_name(&path);
        let default_base = file_name(&default_carrier);
        let output = &self.options.output_path;
        self.shims.push(ShimFile {
            path: output_join(output, &default_carrier),
            contents: format!("exports._default = require('./{base}').default;"),
        });
        self.shims.push(ShimFile {
            path: output_join(output, &shim),
            contents: format!(
                "export * from './{base}';\nexport {{ _default as default }} from './{default_base}';"
            ),
        });
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn output_join(output: &Path, relative: &str) -> PathBuf {
    output.join(relative.strip_prefix("./").unwrap_or(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualpack_config::{BuildMode, Compiler, ExternalPolicy, ExtractCss};
    use serde_json::json;

    fn options() -> NormalizedOptions {
        NormalizedOptions {
            workspace_root: PathBuf::from("/ws"),
            project_name: "ui".into(),
            main: PathBuf::from("/ws/libs/ui/src/index.ts"),
            entry_root: PathBuf::from("/ws/libs/ui/src"),
            project: PathBuf::from("/ws/libs/ui/package.json"),
            project_root: PathBuf::from("/ws/libs/ui"),
            source_root: "libs/ui/src".into(),
            output_path: PathBuf::from("/ws/dist/libs/ui"),
            output_file_name: None,
            delete_output_path: false,
            ts_config: PathBuf::from("/ws/libs/ui/tsconfig.json"),
            allow_js: false,
            formats: vec![],
            external: ExternalPolicy::default(),
            watch: false,
            adjusters: vec![],
            extract_css: ExtractCss::default(),
            assets: vec![],
            compiler: Compiler::Tsc,
            babel_upward_root_mode: false,
            javascript_enabled: false,
            generate_exports_field: true,
            additional_entry_points: vec![],
            skip_type_check: false,
            skip_type_field: false,
            mode: BuildMode::Production,
        }
    }

    #[test]
    fn cjs_only_sets_main_and_commonjs_type() {
        let result = rewrite(&json!({ "name": "@acme/ui" }), &options(), &[Format::Cjs]).unwrap();
        let manifest = result.manifest;

        assert_eq!(manifest["main"], "./index.cjs.js");
        assert_eq!(manifest["type"], "commonjs");
        assert_eq!(manifest["exports"]["."], "./index.cjs.js");
        assert_eq!(manifest["exports"]["./package.json"], "./package.json");
        assert!(manifest.get("module").is_none());
        assert!(result.shims.is_empty());
    }

    #[test]
    fn esm_only_keeps_existing_main() {
        let result = rewrite(
            &json!({ "main": "./legacy.js", "type": "commonjs" }),
            &options(),
            &[Format::Esm],
        )
        .unwrap();
        let manifest = result.manifest;

        assert_eq!(manifest["module"], "./index.esm.js");
        assert_eq!(manifest["main"], "./legacy.js");
        assert_eq!(manifest["type"], "module");
        assert_eq!(manifest["exports"]["."], "./index.esm.js");
    }

    #[test]
    fn esm_only_fills_missing_main() {
        let mut opts = options();
        opts.skip_type_field = true;
        let manifest = rewrite(&json!({}), &opts, &[Format::Esm]).unwrap().manifest;
        assert_eq!(manifest["main"], "./index.esm.js");
        assert!(manifest.get("type").is_none());
    }

    #[test]
    fn dual_format_routes_import_through_shim() {
        let result = rewrite(&json!({}), &options(), &[Format::Esm, Format::Cjs]).unwrap();
        let manifest = &result.manifest;

        assert_eq!(
            manifest["exports"]["."],
            json!({
                "module": "./index.esm.js",
                "import": "./index.cjs.mjs",
                "default": "./index.cjs.js"
            })
        );
        assert_eq!(manifest["main"], "./index.cjs.js");
        assert_eq!(manifest["module"], "./index.esm.js");
        assert!(manifest.get("type").is_none());

        assert_eq!(result.shims.len(), 2);
        assert_eq!(result.shims[0].path, PathBuf::from("/ws/dist/libs/ui/index.cjs.default.js"));
        assert_eq!(
            result.shims[0].contents,
            "exports._default = require('./index.cjs.js').default;"
        );
        assert_eq!(result.shims[1].path, PathBuf::from("/ws/dist/libs/ui/index.cjs.mjs"));
        assert_eq!(
            result.shims[1].contents,
            "export * from './index.cjs.js';\nexport { _default as default } from './index.cjs.default.js';"
        );
    }

    #[test]
    fn string_exports_are_reset() {
        let manifest = rewrite(&json!({ "exports": "./old.js" }), &options(), &[Format::Cjs])
            .unwrap()
            .manifest;
        assert_eq!(
            manifest["exports"],
            json!({ "./package.json": "./package.json", ".": "./index.cjs.js" })
        );
    }

    #[test]
    fn exports_untouched_without_generation() {
        let mut opts = options();
        opts.generate_exports_field = false;
        let manifest = rewrite(&json!({ "exports": "./old.js" }), &opts, &[Format::Esm, Format::Cjs])
            .unwrap()
            .manifest;
        assert_eq!(manifest["exports"], "./old.js");
    }

    #[test]
    fn additional_entries_get_their_own_exports() {
        let mut opts = options();
        opts.output_file_name = Some("ui.js".into());
        opts.additional_entry_points = vec![PathBuf::from("/ws/libs/ui/src/testing.ts")];
        let result = rewrite(&json!({}), &opts, &[Format::Esm, Format::Cjs]).unwrap();

        assert_eq!(result.manifest["main"], "./ui.cjs.js");
        assert_eq!(result.manifest["exports"]["./testing"]["import"], "./testing.cjs.mjs");
        assert_eq!(result.shims.len(), 4);
    }

    #[test]
    fn rewriting_twice_is_stable() {
        let opts = options();
        let formats = [Format::Esm, Format::Cjs];
        let once = rewrite(&json!({ "name": "@acme/ui" }), &opts, &formats).unwrap();
        let twice = rewrite(&once.manifest, &opts, &formats).unwrap();

        assert_eq!(
            serde_json::to_string(&once.manifest["exports"]).unwrap(),
            serde_json::to_string(&twice.manifest["exports"]).unwrap()
        );
        assert_eq!(once.shims, twice.shims);
    }

    #[test]
    fn non_object_manifest_is_rejected() {
        let err = rewrite(&json!([1, 2]), &options(), &[Format::Cjs]).unwrap_err();
        assert!(err.is_configuration());
    }
}
