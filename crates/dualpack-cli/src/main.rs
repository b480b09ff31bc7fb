//! dualpack entry point: parse arguments, set up output, dispatch.

use clap::Parser;
use dualpack_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let no_color = args.no_color || !logger::should_use_colors();
    let cwd = commands::resolve_cwd(args.cwd.as_deref()).map_err(error::cli_error_to_miette)?;
    logger::init_logger(
        args.verbose,
        args.quiet,
        no_color,
        commands::settings_log_level(&cwd),
    );
    ui::init(no_color, args.quiet);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, &cwd).await,
        cli::Command::Plan(plan_args) => commands::plan_execute(plan_args, &cwd).await,
        cli::Command::Schema => commands::schema_execute(),
    };

    result.map_err(error::cli_error_to_miette)
}
