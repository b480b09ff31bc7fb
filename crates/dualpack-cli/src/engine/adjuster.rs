use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dualpack_bundler::{
    AdjusterLoader, ConfigAdjuster, Error, FormatDescriptor, NormalizedOptions, ResolvedPlugin,
};

use super::{Invocation, failure_message, run_with_input};

/// Interpreter used for config adjusters when the settings name none.
pub const DEFAULT_INTERPRETER: &str = "node";

/// Loads config adjusters as scripts run by an interpreter.
#[derive(Debug, Clone)]
pub struct ProcessAdjusterLoader {
    interpreter: String,
    cwd: PathBuf,
}

impl ProcessAdjusterLoader {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            cwd: cwd.into(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }
}

impl AdjusterLoader for ProcessAdjusterLoader {
    fn load(&self, plugin: &ResolvedPlugin) -> dualpack_bundler::Result<Arc<dyn ConfigAdjuster>> {
        if !plugin.path.is_file() {
            return Err(Error::Plugin {
                plugin: plugin.specifier.clone(),
                message: format!("config adjuster not found at {}", plugin.path.display()),
            });
        }
        Ok(Arc::new(ProcessAdjuster {
            specifier: plugin.specifier.clone(),
            interpreter: self.interpreter.clone(),
            args: vec![plugin.path.to_string_lossy().into_owned()],
            cwd: self.cwd.clone(),
        }))
    }
}

/// One adjuster script.
///
/// Reads the descriptor as JSON on stdin, with the normalized options in
/// `DUALPACK_OPTIONS`, and prints the adjusted descriptor on stdout.
#[derive(Debug, Clone)]
pub struct ProcessAdjuster {
    specifier: String,
    interpreter: String,
    args: Vec<String>,
    cwd: PathBuf,
}

impl ProcessAdjuster {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::Plugin {
            plugin: self.specifier.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ConfigAdjuster for ProcessAdjuster {
    async fn adjust(
        &self,
        descriptor: FormatDescriptor,
        options: &NormalizedOptions,
    ) -> dualpack_bundler::Result<FormatDescriptor> {
        let input = serde_json::to_vec(&descriptor)
            .map_err(|err| self.error(format!("failed to encode build descriptor: {err}")))?;
        let options = serde_json::to_string(options)
            .map_err(|err| self.error(format!("failed to encode options: {err}")))?;
        let invocation = Invocation {
            program: &self.interpreter,
            args: &self.args,
            cwd: &self.cwd,
            env: vec![("DUALPACK_OPTIONS", options)],
        };

        let output = run_with_input(&invocation, &input)
            .await
            .map_err(|err| self.error(format!("failed to run '{}': {err}", self.interpreter)))?;
        if !output.status.success() {
            return Err(self.error(failure_message(&output)));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|err| self.error(format!("must print a build descriptor as JSON: {err}")))
    }
}
