use std::path::PathBuf;

use async_trait::async_trait;
use dualpack_bundler::{BundleEngine, BundleOutput, EngineError, FormatDescriptor};
use dualpack_config::EngineSettings;

use super::{Invocation, failure_message, run_with_input};

/// The command that bundles one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Pick the engine from the command line, falling back to the settings.
    ///
    /// `--engine` replaces the configured command and its arguments.
    /// `--engine-arg` alone appends to the configured arguments.
    pub fn resolve(
        program: Option<&str>,
        extra_args: &[String],
        settings: &EngineSettings,
    ) -> Option<Self> {
        match program {
            Some(program) => Some(Self::new(program, extra_args.to_vec())),
            None => settings.command.as_deref().map(|program| {
                let mut args = settings.args.clone();
                args.extend_from_slice(extra_args);
                Self::new(program, args)
            }),
        }
    }
}

/// Runs the engine command once per format.
///
/// The descriptor is written to stdin as JSON. `NODE_ENV` carries the build
/// mode and `DUALPACK_FORMAT` the format. A non-zero exit fails the format
/// with the process's stderr; stdout may hold a JSON [`BundleOutput`].
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    command: EngineCommand,
    cwd: PathBuf,
}

impl ProcessEngine {
    pub fn new(command: EngineCommand, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }

    pub fn command(&self) -> &EngineCommand {
        &self.command
    }
}

#[async_trait]
impl BundleEngine for ProcessEngine {
    async fn bundle(&self, descriptor: &FormatDescriptor) -> Result<BundleOutput, EngineError> {
        let input = serde_json::to_vec(descriptor)
            .map_err(|err| EngineError::new(format!("failed to encode build descriptor: {err}")))?;
        let invocation = Invocation {
            program: &self.command.program,
            args: &self.command.args,
            cwd: &self.cwd,
            env: vec![
                ("NODE_ENV", descriptor.mode.as_node_env().to_string()),
                ("DUALPACK_FORMAT", descriptor.format.to_string()),
            ],
        };

        tracing::debug!(
            format = %descriptor.format,
            program = %self.command.program,
            "running engine"
        );
        let output = run_with_input(&invocation, &input).await.map_err(|err| {
            EngineError::new(format!(
                "failed to run engine '{}': {err}",
                self.command.program
            ))
        })?;

        if !output.status.success() {
            return Err(EngineError::new(failure_message(&output)));
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            tracing::debug!(format = %descriptor.format, "engine: {line}");
        }
        Ok(parse_output(&output.stdout))
    }
}

fn parse_output(stdout: &[u8]) -> BundleOutput {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return BundleOutput::default();
    }
    match serde_json::from_str(text) {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!(error = %err, "engine output is not a bundle report");
            BundleOutput::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::descriptor;
    use dualpack_bundler::Artifact;

    #[test]
    fn cli_engine_replaces_settings() {
        let settings = EngineSettings {
            command: Some("node".into()),
            args: vec!["tools/engine.js".into()],
        };

        let explicit = EngineCommand::resolve(Some("sh"), &["-c".into()], &settings).unwrap();
        assert_eq!(explicit, EngineCommand::new("sh", vec!["-c".into()]));

        let appended = EngineCommand::resolve(None, &["--minify".into()], &settings).unwrap();
        assert_eq!(appended.program, "node");
        assert_eq!(appended.args, vec!["tools/engine.js", "--minify"]);

        assert!(EngineCommand::resolve(None, &[], &EngineSettings::default()).is_none());
    }

    #[test]
    fn stdout_report_is_optional() {
        assert_eq!(parse_output(b""), BundleOutput::default());
        assert_eq!(parse_output(b"bundled in 40ms\n"), BundleOutput::default());

        let output = parse_output(br#"{ "artifacts": [{ "fileName": "index.cjs.js", "size": 42 }] }"#);
        assert_eq!(
            output.artifacts,
            vec![Artifact {
                file_name: "index.cjs.js".into(),
                size: 42
            }]
        );
    }

    #[cfg(unix)]
    fn sh(script: &str) -> ProcessEngine {
        ProcessEngine::new(
            EngineCommand::new("sh", vec!["-c".into(), script.into()]),
            std::env::temp_dir(),
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn engine_receives_descriptor_and_environment() {
        let engine = sh(
            r#"input=$(cat); case "$input" in *'"projectName":"ui"'*) ;; *) exit 3;; esac
test "$NODE_ENV" = development || exit 4
test "$DUALPACK_FORMAT" = cjs || exit 5
echo '{"artifacts":[{"fileName":"index.cjs.js","size":7}]}'"#,
        );

        let output = engine.bundle(&descriptor()).await.unwrap();
        assert_eq!(output.artifacts.len(), 1);
        assert_eq!(output.artifacts[0].size, 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let engine = sh("cat >/dev/null; echo 'index.ts: Unexpected token' >&2; exit 1");
        let err = engine.bundle(&descriptor()).await.unwrap_err();
        assert_eq!(err.message, "index.ts: Unexpected token");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn engine_may_ignore_stdin() {
        let engine = sh("exit 0");
        assert!(engine.bundle(&descriptor()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_program_is_an_engine_error() {
        let engine = ProcessEngine::new(
            EngineCommand::new("dualpack-no-such-engine", vec![]),
            std::env::temp_dir(),
        );
        let err = engine.bundle(&descriptor()).await.unwrap_err();
        assert!(err.message.contains("failed to run engine 'dualpack-no-such-engine'"));
    }
}
