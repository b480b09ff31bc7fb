//! # dualpack-bundler
//!
//! Turns declarative build options into a per-format build plan, drives a
//! bundling engine through it (once or in watch mode), and rewrites the
//! package manifest so CommonJS and ES module consumers both resolve the
//! right entry point from a single published package.
//!
//! The stages run leaf-first:
//!
//! 1. [`normalize`] resolves paths, assets, entry points and adjusters.
//! 2. [`formats`] infers the output formats from the tsconfig module kind.
//! 3. [`externals`] computes the set of packages left as runtime imports.
//! 4. [`plan`] assembles one [`FormatDescriptor`] per format.
//! 5. [`driver`] executes the descriptors through a [`BundleEngine`].
//! 6. [`manifest`] patches and persists `package.json`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dualpack_bundler::{BuildRequest, ExecutorContext, driver};
//! # use dualpack_bundler::{BundleEngine, BundleOutput, EngineError, FormatDescriptor};
//! # struct Engine;
//! # #[async_trait::async_trait]
//! # impl BundleEngine for Engine {
//! #     async fn bundle(&self, _: &FormatDescriptor) -> Result<BundleOutput, EngineError> {
//! #         Ok(BundleOutput::default())
//! #     }
//! # }
//!
//! # async fn run(context: ExecutorContext, options: dualpack_config::RawOptions) -> dualpack_bundler::Result<()> {
//! let request = BuildRequest::prepare(options, &context).await?;
//! let plan = request.compile(&dualpack_bundler::AdjusterRegistry::default()).await?;
//! let report = driver::run_once(&request, &plan, &Engine).await?;
//! assert!(report.result.success);
//! # Ok(()) }
//! ```

pub mod driver;
pub mod engine;
pub mod externals;
pub mod formats;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod normalize;
pub mod plan;
pub mod request;
pub mod tsconfig;
pub mod workspace;

pub use driver::{BuildReport, BuildResult, ChangeSource, ChannelChangeSource, WatchEvent};
pub use engine::{Artifact, BundleEngine, BundleOutput, EngineError};
pub use externals::ExternalSet;
pub use logging::LogLevel;
pub use manifest::{ManifestRewrite, ShimFile};
pub use normalize::{AssetEntry, NormalizedOptions, PluginKind, ResolvedPlugin};
pub use plan::{
    AdjusterLoader, AdjusterRegistry, BuildPlan, ConfigAdjuster, FormatDescriptor, PipelineStage,
};
pub use request::BuildRequest;
pub use workspace::{BuildableDependency, ExecutorContext, ProjectGraph};

pub use dualpack_config::{BuildMode, Compiler, Format};

/// Error types for dualpack-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or contradictory user input.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Option loading or validation failed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] dualpack_config::ConfigError),

    /// The source compiler or type checker rejected the input.
    #[error("Compiler error ({format}): {message}")]
    Compiler { format: Format, message: String },

    /// A config adjuster or pipeline plugin failed.
    #[error("Plugin error ({plugin}): {message}")]
    Plugin { plugin: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// The watch session failed and cannot continue.
    #[error("Watch error: {0}")]
    Watch(String),
}

/// Result type alias for dualpack-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Attach a message to an I/O error.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::IoError {
            message: message.into(),
            source,
        }
    }

    /// Whether the error was raised before any engine invocation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::Config(_) | Error::InvalidOutputPath(_)
        )
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Configuration(_) | Error::Config(_) => "dualpack::configuration",
            Error::Compiler { .. } => "dualpack::compiler",
            Error::Plugin { .. } => "dualpack::plugin",
            Error::Io(_) | Error::IoError { .. } => "dualpack::io",
            Error::InvalidOutputPath(_) => "dualpack::output_path",
            Error::Watch(_) => "dualpack::watch",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Configuration(_) | Error::Config(_) => Some(Box::new(
                "Check the target options in project.json.",
            )),
            Error::Compiler { format, .. } => Some(Box::new(format!(
                "Fix the reported source errors; the {format} bundle was not written."
            ))),
            Error::Plugin { plugin, .. } => Some(Box::new(format!(
                "The config adjuster '{plugin}' must return a build descriptor."
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' is invalid. Ensure it's within the workspace and doesn't contain '..' components."
            ))),
            Error::Io(_) | Error::IoError { .. } => Some(Box::new(
                "Check that the files exist and that you have permission to write the output directory.",
            )),
            Error::Watch(_) => None,
        }
    }
}
