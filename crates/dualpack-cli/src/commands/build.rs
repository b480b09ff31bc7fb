//! `dualpack build`.

use std::path::Path;

use dualpack_bundler::{BuildPlan, BuildRequest, driver};
use tokio_stream::StreamExt;

use crate::cli::BuildArgs;
use crate::commands::utils::Session;
use crate::config::Overrides;
use crate::engine::{EngineCommand, ProcessEngine};
use crate::error::{BuildError, Result};
use crate::ui;
use crate::watcher::{ChangeFilter, DEBOUNCE, FsChangeSource};

/// Execute the build command.
///
/// 1. Open the workspace and load the layered target options
/// 2. Prepare the request and compile the plan (adjusters included)
/// 3. Run the engine once per format, or keep rebuilding in watch mode
///
/// A failed one-shot build is an error so the process exits non-zero.
pub async fn execute(args: BuildArgs, cwd: &Path) -> Result<()> {
    let spinner = ui::Spinner::new("Loading options...");
    let session = Session::open(cwd, &args.selection)?;
    let command = EngineCommand::resolve(
        args.engine.as_deref(),
        &args.engine_args,
        &session.settings.engine,
    )
    .ok_or(BuildError::NoEngine)?;

    let request = session.prepare(&Overrides::from(&args)).await?;
    spinner.set_message("Compiling build plan...");
    let plan = request.compile(&session.adjuster_loader()).await?;
    spinner.clear();

    tracing::debug!(
        program = %command.program,
        formats = plan.len(),
        "starting build"
    );
    let engine = ProcessEngine::new(command, &session.root);

    if request.options.watch {
        watch(&session, &request, &plan, &engine).await
    } else {
        once(&request, &plan, &engine).await
    }
}

async fn once(request: &BuildRequest, plan: &BuildPlan, engine: &ProcessEngine) -> Result<()> {
    let report = driver::run_once(request, plan, engine).await?;
    ui::print_build_summary(&report);

    if !report.result.success {
        return Err(BuildError::Failed(request.options.project_name.clone()).into());
    }
    if let Some(manifest) = &report.manifest {
        ui::success(&format!("Wrote {}", manifest.display()));
    }
    Ok(())
}

async fn watch(
    session: &Session,
    request: &BuildRequest,
    plan: &BuildPlan,
    engine: &ProcessEngine,
) -> Result<()> {
    // Event paths arrive canonicalized on some platforms.
    let root = session
        .root
        .canonicalize()
        .unwrap_or_else(|_| session.root.clone());
    let output = request
        .options
        .output_path
        .strip_prefix(&request.options.workspace_root)
        .map(|relative| root.join(relative))
        .unwrap_or_else(|_| request.options.output_path.clone());

    let source = FsChangeSource::new(ChangeFilter::new(&root, vec![output]), DEBOUNCE)?;
    let stream = driver::watch(request, plan, engine, source);
    tokio::pin!(stream);

    let project = &request.options.project_name;
    loop {
        tokio::select! {
            next = stream.next() => match next {
                Some(Ok(result)) if !result.success => {
                    ui::warning(&format!("Bundle failed: {project}. Waiting for changes..."));
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => {
                ui::info("Stopping watch mode");
                return Ok(());
            }
        }
    }
}
