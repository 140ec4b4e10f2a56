use async_trait::async_trait;

use super::snapshot::ProgressSnapshot;
use crate::types::types::DownloadError;

/// Trait for anything that wants to observe download progress.
///
/// The `ProgressNotifier` calls these methods on all registered observers
/// after folding raw `ProgressEvent`s into a `ProgressSnapshot`.
///
/// Lifecycle:
/// - `on_progress` is called once per completed step.
/// - `on_complete` is called once when the run finishes (the progress
///   channel closed without an error).
/// - `on_error` is called once when the run is cancelled.
///
/// Exactly one of `on_complete` / `on_error` is called per run.
#[async_trait]
pub trait ProgressObserver: Send + Sync + 'static {
    async fn on_progress(&self, snapshot: &ProgressSnapshot);

    async fn on_complete(&self, snapshot: &ProgressSnapshot);

    async fn on_error(&self, error: &DownloadError);
}
