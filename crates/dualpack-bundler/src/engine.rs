//! Bundling-engine capability.
//!
//! The engine turns one [`FormatDescriptor`] into written artifacts. It owns
//! parsing, transforming and chunking; this crate only decides what to ask
//! for and what to do with the answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::plan::FormatDescriptor;

/// One emitted file, relative to the descriptor's output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleOutput {
    pub artifacts: Vec<Artifact>,
}

/// A build failure reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait BundleEngine: Send + Sync {
    async fn bundle(&self, descriptor: &FormatDescriptor) -> Result<BundleOutput, EngineError>;
}
