//! Output format inference.

use dualpack_config::Format;

use crate::tsconfig::{ModuleKind, TsConfig};

/// Default format for a tsconfig module kind.
///
/// CommonJS, UMD and AMD map to `cjs`; every other kind, including an
/// absent one, maps to `esm`.
pub fn read_compatible_formats(module: Option<ModuleKind>) -> Vec<Format> {
    match module {
        Some(kind) if kind.is_commonjs_like() => vec![Format::Cjs],
        _ => vec![Format::Esm],
    }
}

/// Use the requested formats, or infer one from the tsconfig when none were given.
pub fn resolve_formats(requested: &[Format], tsconfig: &TsConfig) -> Vec<Format> {
    if requested.is_empty() {
        let inferred = read_compatible_formats(tsconfig.module);
        tracing::debug!(tsconfig = %tsconfig.path.display(), format = %inferred[0], "inferred output format");
        inferred
    } else {
        requested.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn module_kind() -> impl Strategy<Value = Option<ModuleKind>> {
        prop::option::of(prop::sample::select(ModuleKind::ALL.to_vec()))
    }

    proptest! {
        #[test]
        fn inference_yields_exactly_one_format(module in module_kind()) {
            let tsconfig = TsConfig { module, ..TsConfig::default() };
            let formats = resolve_formats(&[], &tsconfig);
            prop_assert_eq!(formats.len(), 1);
            prop_assert!(formats == vec![Format::Cjs] || formats == vec![Format::Esm]);
        }
    }

    #[test]
    fn legacy_module_kinds_map_to_cjs() {
        for kind in [ModuleKind::CommonJs, ModuleKind::Umd, ModuleKind::Amd] {
            assert_eq!(read_compatible_formats(Some(kind)), vec![Format::Cjs]);
        }
        assert_eq!(read_compatible_formats(Some(ModuleKind::NodeNext)), vec![Format::Esm]);
        assert_eq!(read_compatible_formats(None), vec![Format::Esm]);
    }

    #[test]
    fn explicit_formats_are_kept() {
        let tsconfig = TsConfig {
            module: Some(ModuleKind::CommonJs),
            ..TsConfig::default()
        };
        assert_eq!(
            resolve_formats(&[Format::Esm, Format::Cjs], &tsconfig),
            vec![Format::Esm, Format::Cjs]
        );
    }
}
