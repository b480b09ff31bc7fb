//! Command-line overrides for target options.
//!
//! The overrides are the top layer of the option figment, so only flags
//! that were actually given are serialized. An absent switch never resets
//! a value set in `project.json`.

use dualpack_config::{BuildMode, Compiler, Format};
use serde::Serialize;

use crate::cli::{BuildArgs, SelectionArgs};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<Compiler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,
    #[serde(skip_serializing_if = "is_false")]
    pub skip_type_check: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub generate_exports_field: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub watch: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub delete_output_path: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<&SelectionArgs> for Overrides {
    fn from(args: &SelectionArgs) -> Self {
        Self {
            format: args.format.clone(),
            output_path: args.output_path.clone(),
            compiler: args.compiler,
            mode: args.mode,
            skip_type_check: args.skip_type_check,
            generate_exports_field: args.generate_exports_field,
            ..Self::default()
        }
    }
}

impl From<&BuildArgs> for Overrides {
    fn from(args: &BuildArgs) -> Self {
        Self {
            watch: args.watch,
            delete_output_path: args.delete_output_path,
            ..Self::from(&args.selection)
        }
    }
}
