use indexmap::IndexMap;

use crate::normalize::NormalizedOptions;
use crate::plan::file_stem;

pub const ESM_EXT: &str = ".esm.js";
pub const CJS_EXT: &str = ".cjs.js";

/// Export specifier to output-relative file for one format.
///
/// `"."` names the primary entry; each secondary entry is exported under
/// its own file stem.
pub fn get_exports(options: &NormalizedOptions, ext: &str) -> IndexMap<String, String> {
    let prefix = match &options.output_file_name {
        Some(name) => strip_source_ext(name).to_string(),
        None => {
            let base = options
                .main
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            strip_source_ext(&base).to_string()
        }
    };

    let mut exports = IndexMap::new();
    exports.insert(".".to_string(), format!("./{prefix}{ext}"));
    for entry in &options.additional_entry_points {
        let stem = file_stem(entry);
        exports.insert(format!("./{stem}"), format!("./{stem}{ext}"));
    }
    exports
}

fn strip_source_ext(name: &str) -> &str {
    name.strip_suffix(".ts")
        .or_else(|| name.strip_suffix(".js"))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_only_script_extensions() {
        assert_eq!(strip_source_ext("index.ts"), "index");
        assert_eq!(strip_source_ext("index.js"), "index");
        assert_eq!(strip_source_ext("index.tsx"), "index.tsx");
        assert_eq!(strip_source_ext("ui.lib"), "ui.lib");
    }
}
