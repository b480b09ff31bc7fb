//! Config adjusters.
//!
//! An adjuster is a user-supplied transform applied to every compiled
//! descriptor, in declaration order. How a specifier becomes an adjuster is
//! left to an [`AdjusterLoader`]: the CLI spawns a process per adjuster,
//! embedders can register compiled-in transforms in an [`AdjusterRegistry`].

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use super::descriptor::FormatDescriptor;
use crate::normalize::{NormalizedOptions, ResolvedPlugin};
use crate::{Error, Result};

/// A transform `descriptor -> descriptor`.
#[async_trait]
pub trait ConfigAdjuster: Send + Sync {
    async fn adjust(
        &self,
        descriptor: FormatDescriptor,
        options: &NormalizedOptions,
    ) -> Result<FormatDescriptor>;
}

/// Maps a resolved adjuster reference to a callable transform.
pub trait AdjusterLoader: Send + Sync {
    fn load(&self, plugin: &ResolvedPlugin) -> Result<Arc<dyn ConfigAdjuster>>;
}

/// Adapter for plain functions.
pub struct FnAdjuster<F>(pub F);

#[async_trait]
impl<F> ConfigAdjuster for FnAdjuster<F>
where
    F: Fn(FormatDescriptor, &NormalizedOptions) -> Result<FormatDescriptor> + Send + Sync,
{
    async fn adjust(
        &self,
        descriptor: FormatDescriptor,
        options: &NormalizedOptions,
    ) -> Result<FormatDescriptor> {
        (self.0)(descriptor, options)
    }
}

/// Adjusters registered ahead of time, keyed by specifier.
///
/// A lookup tries the specifier as written, then the resolved path.
#[derive(Default, Clone)]
pub struct AdjusterRegistry {
    adjusters: FxHashMap<String, Arc<dyn ConfigAdjuster>>,
}

impl AdjusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, adjuster: Arc<dyn ConfigAdjuster>) -> &mut Self {
        self.adjusters.insert(key.into(), adjuster);
        self
    }

    pub fn register_fn<F>(&mut self, key: impl Into<String>, adjust: F) -> &mut Self
    where
        F: Fn(FormatDescriptor, &NormalizedOptions) -> Result<FormatDescriptor>
            + Send
            + Sync
            + 'static,
    {
        self.register(key, Arc::new(FnAdjuster(adjust)))
    }

    pub fn len(&self) -> usize {
        self.adjusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjusters.is_empty()
    }
}

impl AdjusterLoader for AdjusterRegistry {
    fn load(&self, plugin: &ResolvedPlugin) -> Result<Arc<dyn ConfigAdjuster>> {
        self.adjusters
            .get(&plugin.specifier)
            .or_else(|| self.adjusters.get(plugin.path.to_string_lossy().as_ref()))
            .cloned()
            .ok_or_else(|| Error::Plugin {
                plugin: plugin.specifier.clone(),
                message: format!("no adjuster found at {}", plugin.path.display()),
            })
    }
}

impl std::fmt::Debug for AdjusterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.adjusters.keys().collect();
        keys.sort();
        f.debug_struct("AdjusterRegistry").field("adjusters", &keys).finish()
    }
}

/// Run every declared adjuster over `descriptor`, in order.
pub(crate) async fn apply_adjusters(
    mut descriptor: FormatDescriptor,
    options: &NormalizedOptions,
    loader: &dyn AdjusterLoader,
) -> Result<FormatDescriptor> {
    for plugin in &options.adjusters {
        let adjuster = loader.load(plugin)?;
        descriptor = adjuster
            .adjust(descriptor, options)
            .await
            .map_err(|err| match err {
                Error::Plugin { .. } => err,
                other => Error::Plugin {
                    plugin: plugin.specifier.clone(),
                    message: other.to_string(),
                },
            })?;
        tracing::debug!(
            adjuster = %plugin.specifier,
            format = %descriptor.format,
            "applied config adjuster"
        );
    }
    Ok(descriptor)
}
