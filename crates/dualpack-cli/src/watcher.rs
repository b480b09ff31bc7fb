//! Filesystem change source for watch mode.
//!
//! Watches the workspace recursively, drops events under ignored
//! directories, and batches whatever arrives within the debounce window
//! into one rebuild.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use dualpack_bundler::ChangeSource;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// Default quiet period before a batch is released.
pub const DEBOUNCE: Duration = Duration::from_millis(150);

/// Directory names never watched, wherever they appear.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

/// Which paths count as changes.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    ignored: Vec<PathBuf>,
}

impl ChangeFilter {
    /// `ignored` paths (typically the output directory) are skipped along
    /// with everything below them.
    pub fn new(root: impl Into<PathBuf>, ignored: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignored,
        }
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        if relative.components().any(|component| {
            IGNORED_DIRS
                .iter()
                .any(|dir| component.as_os_str() == *dir)
        }) {
            return false;
        }
        !self.ignored.iter().any(|ignored| path.starts_with(ignored))
    }
}

/// [`ChangeSource`] backed by `notify`.
///
/// Dropping it drops the watcher, which stops watching immediately.
pub struct FsChangeSource {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<notify::Result<Event>>,
    filter: ChangeFilter,
    debounce: Duration,
}

impl FsChangeSource {
    pub fn new(filter: ChangeFilter, debounce: Duration) -> Result<Self> {
        if !filter.root.exists() {
            return Err(CliError::FileNotFound(filter.root.clone()));
        }

        let (tx, receiver) = mpsc::channel(256);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver is gone once the session ends.
            let _ = tx.blocking_send(res);
        })?;
        watcher.watch(&filter.root, RecursiveMode::Recursive)?;
        tracing::debug!(root = %filter.root.display(), "watching for changes");

        Ok(Self {
            _watcher: watcher,
            receiver,
            filter,
            debounce,
        })
    }

    /// Relevant paths of one event, or a fatal error.
    fn accept(&self, event: notify::Result<Event>, batch: &mut BTreeSet<PathBuf>) -> Option<dualpack_bundler::Error> {
        match event {
            Ok(event) if is_content_change(&event.kind) => {
                batch.extend(
                    event
                        .paths
                        .into_iter()
                        .filter(|path| self.filter.is_relevant(path)),
                );
                None
            }
            Ok(_) => None,
            Err(err) => Some(dualpack_bundler::Error::Watch(err.to_string())),
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[async_trait]
impl ChangeSource for FsChangeSource {
    async fn next_change(&mut self) -> Option<dualpack_bundler::Result<Vec<PathBuf>>> {
        let mut batch = BTreeSet::new();
        loop {
            let event = if batch.is_empty() {
                self.receiver.recv().await?
            } else {
                match tokio::time::timeout(self.debounce, self.receiver.recv()).await {
                    Ok(Some(event)) => event,
                    // Quiet period elapsed, or the watcher went away mid-batch.
                    Ok(None) | Err(_) => return Some(Ok(batch.into_iter().collect())),
                }
            };
            if let Some(err) = self.accept(event, &mut batch) {
                return Some(Err(err));
            }
        }
    }
}
