//! Watch sessions.
//!
//! A session is a lazy stream: the first cycle builds when the stream is
//! first polled, and every batch from the [`ChangeSource`] triggers another.
//! The change source lives inside the stream, so dropping the stream closes
//! the underlying watcher.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::Stream;

use super::BuildResult;
use super::report::log_artifacts;
use crate::engine::{BundleEngine, EngineError};
use crate::fs::delete_output_dir;
use crate::manifest;
use crate::plan::BuildPlan;
use crate::request::BuildRequest;
use crate::{Format, Result};

/// Yields batches of changed paths.
///
/// `None` ends the session; `Some(Err(_))` is a fatal watcher failure.
#[async_trait]
pub trait ChangeSource: Send {
    async fn next_change(&mut self) -> Option<Result<Vec<PathBuf>>>;
}

/// Change batches fed through a channel.
pub struct ChannelChangeSource {
    receiver: mpsc::Receiver<Result<Vec<PathBuf>>>,
}

impl ChannelChangeSource {
    pub fn new(receiver: mpsc::Receiver<Result<Vec<PathBuf>>>) -> Self {
        Self { receiver }
    }

    /// A source and the sender that drives it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<Vec<PathBuf>>>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, Self::new(receiver))
    }
}

#[async_trait]
impl ChangeSource for ChannelChangeSource {
    async fn next_change(&mut self) -> Option<Result<Vec<PathBuf>>> {
        self.receiver.recv().await
    }
}

/// Progress of one watch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The cycle began.
    Start,
    BundleStart { format: Format },
    BundleEnd { format: Format, duration: Duration },
    /// Every format built.
    End,
    /// A format failed; the cycle stops here.
    Error { format: Format, error: EngineError },
}

/// Build every format once, stopping at the first failure.
///
/// Start and end events of different formats never interleave.
pub async fn run_cycle<E>(plan: &BuildPlan, engine: &E) -> Vec<WatchEvent>
where
    E: BundleEngine + ?Sized,
{
    let mut events = vec![WatchEvent::Start];
    for descriptor in &plan.descriptors {
        let format = descriptor.format;
        events.push(WatchEvent::BundleStart { format });
        let start = Instant::now();
        match engine.bundle(descriptor).await {
            Ok(output) => {
                log_artifacts(&output);
                events.push(WatchEvent::BundleEnd {
                    format,
                    duration: start.elapsed(),
                });
            }
            Err(error) => {
                events.push(WatchEvent::Error { format, error });
                return events;
            }
        }
    }
    events.push(WatchEvent::End);
    events
}

/// Watch `request`, rebuilding on every change batch from `source`.
///
/// Failed cycles are reported as `success: false` and the session keeps
/// going. Watcher failures and manifest write failures end the stream with
/// an error.
pub fn watch<'a, E, S>(
    request: &'a BuildRequest,
    plan: &'a BuildPlan,
    engine: &'a E,
    mut source: S,
) -> impl Stream<Item = Result<BuildResult>> + Send + 'a
where
    E: BundleEngine + ?Sized,
    S: ChangeSource + 'a,
{
    async_stream::try_stream! {
        let options = &request.options;
        if options.delete_output_path {
            delete_output_dir(&options.workspace_root, &options.output_path).await?;
        }

        loop {
            tracing::info!(project = %options.project_name, "Bundling {}...", options.project_name);
            let events = run_cycle(plan, engine).await;
            yield finish_cycle(request, &events).await?;

            match source.next_change().await {
                None => break,
                Some(Err(err)) => Err::<(), crate::Error>(err)?,
                Some(Ok(paths)) => {
                    tracing::debug!(changed = paths.len(), "change detected, rebuilding");
                }
            }
        }
    }
}

async fn finish_cycle(request: &BuildRequest, events: &[WatchEvent]) -> Result<BuildResult> {
    for event in events {
        match event {
            WatchEvent::BundleEnd { format, duration } => {
                tracing::debug!(%format, elapsed_ms = duration.as_millis() as u64, "format built");
            }
            WatchEvent::Error { format, error } => {
                tracing::error!(%format, "Error during bundle: {error}");
                return Ok(BuildResult::failed());
            }
            WatchEvent::End => {
                let rewrite = manifest::rewrite(&request.manifest, &request.options, &request.formats)?;
                manifest::persist(&rewrite, &request.options.output_path).await?;
                tracing::info!("Bundle complete. Watching for file changes...");
                return Ok(BuildResult::succeeded(request.outfile()));
            }
            WatchEvent::Start | WatchEvent::BundleStart { .. } => {}
        }
    }
    Ok(BuildResult::failed())
}
