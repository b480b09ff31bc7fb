//! Schema-level validation of [`RawOptions`].
//!
//! Runs before any path is touched, so it catches trivially invalid input
//! without filesystem access.

use crate::error::{ConfigError, Result};
use crate::options::{AssetOption, ExternalPolicy, RawOptions};

pub fn validate(options: &RawOptions) -> Result<()> {
    require_non_empty(options.main.as_deref(), "main")?;
    let output_path = require_non_empty(options.output_path.as_deref(), "outputPath")?;

    if matches!(output_path.trim_end_matches('/'), "" | ".") {
        return Err(ConfigError::InvalidValue(
            "outputPath must not be the workspace root".to_string(),
        ));
    }

    if let Some(ExternalPolicy::List(names)) = &options.external {
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "external must not contain empty package names".to_string(),
            ));
        }
    }

    if options
        .additional_entry_points
        .iter()
        .any(|entry| entry.trim().is_empty())
    {
        return Err(ConfigError::InvalidValue(
            "additionalEntryPoints must not contain empty paths".to_string(),
        ));
    }

    for asset in &options.assets {
        match asset {
            AssetOption::Path(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "asset paths must not be empty".to_string(),
                ));
            }
            AssetOption::Pattern(pattern) if pattern.glob.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(format!(
                    "asset rule for '{}' has an empty glob",
                    pattern.input
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

fn require_non_empty<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingOption(name)),
    }
}
