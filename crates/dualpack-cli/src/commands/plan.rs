//! `dualpack plan`: compile the build plan without running the engine.

use std::path::Path;

use crate::cli::PlanArgs;
use crate::commands::utils::Session;
use crate::config::Overrides;
use crate::error::Result;

pub async fn execute(args: PlanArgs, cwd: &Path) -> Result<()> {
    let session = Session::open(cwd, &args.selection)?;
    let request = session.prepare(&Overrides::from(&args.selection)).await?;
    let plan = request.compile(&session.adjuster_loader()).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&plan.descriptors)?
    } else {
        serde_json::to_string(&plan.descriptors)?
    };
    println!("{json}");
    Ok(())
}
