//! Layered option loading.
//!
//! Priority (highest wins): overrides > selected configuration > target
//! options > built-in defaults.

use figment::{Figment, providers::Serialized};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::options::RawOptions;
use crate::project::ProjectConfig;
use crate::validation::validate;

/// Which target and configuration to read options from.
#[derive(Debug, Clone, Default)]
pub struct OptionSelection {
    pub target: String,
    pub configuration: Option<String>,
}

impl OptionSelection {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            configuration: None,
        }
    }

    pub fn with_configuration(mut self, configuration: Option<String>) -> Self {
        self.configuration = configuration;
        self
    }
}

/// Build the figment for one target without extracting it.
pub fn options_figment<O: Serialize>(
    project: &ProjectConfig,
    selection: &OptionSelection,
    overrides: &O,
) -> Result<Figment> {
    let target = project.target(&selection.target)?;

    let mut figment = Figment::from(Serialized::defaults(RawOptions::default()));
    if !target.options.is_null() {
        figment = figment.merge(Serialized::defaults(object(&target.options, "options")?));
    }

    let configuration = selection
        .configuration
        .as_deref()
        .or(target.default_configuration.as_deref());
    if let Some(name) = configuration {
        let layer = target.configurations.get(name).ok_or_else(|| {
            ConfigError::UnknownConfiguration {
                target: selection.target.clone(),
                configuration: name.to_string(),
            }
        })?;
        tracing::debug!(target = %selection.target, configuration = name, "applying configuration");
        figment = figment.merge(Serialized::defaults(object(layer, name)?));
    }

    Ok(figment.merge(Serialized::defaults(overrides)))
}

/// Load, layer and validate the options of one target.
pub fn load_options<O: Serialize>(
    project: &ProjectConfig,
    selection: &OptionSelection,
    overrides: &O,
) -> Result<RawOptions> {
    let options: RawOptions = options_figment(project, selection, overrides)?.extract()?;
    validate(&options)?;
    Ok(options)
}

fn object<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue(format!(
            "'{name}' must be an object"
        )))
    }
}
