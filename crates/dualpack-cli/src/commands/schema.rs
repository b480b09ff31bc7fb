//! `dualpack schema`: the JSON schema of target options.

use crate::error::Result;

pub fn execute() -> Result<()> {
    let schema = dualpack_config::options_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
