//! Command implementations.
//!
//! - [`build`] - build a target once or in watch mode
//! - [`plan`] - print the compiled build descriptors
//! - [`schema`] - print the target options schema

pub mod build;
pub mod plan;
pub mod schema;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use plan::execute as plan_execute;
pub use schema::execute as schema_execute;
pub use utils::{resolve_cwd, settings_log_level};
