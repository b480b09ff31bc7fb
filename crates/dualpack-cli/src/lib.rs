//! dualpack CLI.
//!
//! Wires the build pipeline from `dualpack-bundler` to the workspace on
//! disk: project records and settings are loaded through `dualpack-config`,
//! formats are built by an external engine process, and watch mode is fed
//! by a `notify` watcher.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `build`, `plan` and `schema`
//! - [`engine`] - process-backed engine and config adjusters
//! - [`watcher`] - filesystem change source
//! - [`logger`] / [`ui`] - logs and status output on stderr
//! - [`error`] - CLI errors and miette rendering

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watcher;

pub use error::{BuildError, CliError, Result, ResultExt};
