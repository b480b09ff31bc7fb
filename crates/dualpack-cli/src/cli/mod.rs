//! Command-line interface definition.
//!
//! - `dualpack build` - build a library target once or in watch mode
//! - `dualpack plan` - print the compiled per-format build descriptors
//! - `dualpack schema` - print the JSON schema of target options

mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{BuildArgs, Command, PlanArgs, SelectionArgs};

/// dualpack - dual-format library builds for workspace projects
#[derive(Parser, Debug)]
#[command(
    name = "dualpack",
    version,
    about = "Build workspace libraries as ES module and CommonJS packages",
    long_about = "dualpack reads a library target from project.json, compiles one build\n\
                  descriptor per output format, runs the configured bundling engine for\n\
                  each of them, and rewrites package.json so both module systems resolve\n\
                  the right entry point."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run as if started in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
