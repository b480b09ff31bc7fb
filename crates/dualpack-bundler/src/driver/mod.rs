//! Build execution.
//!
//! [`run_once`] builds every format in order and rewrites the manifest only
//! when all of them succeeded. [`watch`] rebuilds on every change batch and
//! yields one [`BuildResult`] per cycle.

mod oneshot;
mod report;
mod watch;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::Artifact;

pub use oneshot::run_once;
pub use report::{format_bytes, format_duration};
pub use watch::{ChangeSource, ChannelChangeSource, WatchEvent, run_cycle, watch};

/// Outcome of one build or one watch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub success: bool,
    /// The CommonJS primary artifact, when one was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outfile: Option<PathBuf>,
}

impl BuildResult {
    pub fn succeeded(outfile: Option<PathBuf>) -> Self {
        Self {
            success: true,
            outfile,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            outfile: None,
        }
    }
}

/// Summary of a one-shot build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub result: BuildResult,
    pub elapsed: Duration,
    /// Artifacts of every format that built.
    pub artifacts: Vec<Artifact>,
    /// The written manifest, on success.
    pub manifest: Option<PathBuf>,
}
