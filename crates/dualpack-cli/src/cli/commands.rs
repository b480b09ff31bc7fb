use std::path::PathBuf;

use clap::{Args, Subcommand};
use dualpack_config::{BuildMode, Compiler, Format};

/// Available dualpack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a library target
    ///
    /// Runs the bundling engine once per output format and rewrites the
    /// output package.json when every format succeeded.
    Build(BuildArgs),

    /// Print the compiled build descriptors as JSON
    ///
    /// Resolves options, formats and externals and applies config
    /// adjusters, without running the bundling engine.
    Plan(PlanArgs),

    /// Print the JSON schema of target options
    Schema,
}

/// Which project, target and configuration to read options from
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Project directory (defaults to the working directory)
    ///
    /// The nearest project.json in this directory or above is used.
    #[arg(value_name = "PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Target to build (defaults to the workspace setting, then "build")
    #[arg(short, long, value_name = "NAME")]
    pub target: Option<String>,

    /// Named configuration layered over the target options
    #[arg(short, long, value_name = "NAME")]
    pub configuration: Option<String>,

    /// Output formats, overriding the target options
    ///
    /// Examples:
    ///   --format esm --format cjs
    ///   --format esm,cjs
    #[arg(short, long, value_name = "FORMAT", value_delimiter = ',')]
    pub format: Vec<Format>,

    /// Output directory, relative to the workspace root
    #[arg(short, long, value_name = "DIR")]
    pub output_path: Option<String>,

    /// Source compiler (babel, swc or tsc)
    #[arg(long, value_name = "COMPILER")]
    pub compiler: Option<Compiler>,

    /// Skip the type check
    #[arg(long)]
    pub skip_type_check: bool,

    /// Write an `exports` map into the output package.json
    #[arg(long)]
    pub generate_exports_field: bool,

    /// Build mode handed to the engine (production or development)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<BuildMode>,

    /// Project-graph JSON file (overrides the workspace setting)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Rebuild whenever a workspace file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Remove the output directory before building
    #[arg(long)]
    pub delete_output_path: bool,

    /// Bundling engine command (overrides the workspace setting)
    #[arg(long, value_name = "CMD")]
    pub engine: Option<String>,

    /// Argument passed to the engine command; repeatable
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}
