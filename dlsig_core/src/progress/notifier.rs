use std::time::Instant;

use tokio::sync::mpsc;

use super::observer::ProgressObserver;
use super::snapshot::{estimate_eta, ProgressSnapshot};
use crate::types::types::{DownloadError, ProgressEvent};

/// Consumes `Result<ProgressEvent, DownloadError>` from a downloader's progress
/// channel, folds it into `ProgressSnapshot`s, and fans out to all registered
/// observers.
///
/// # Lifecycle
///
/// | Channel message           | Observer method called          |
/// |---------------------------|---------------------------------|
/// | `Ok(ProgressEvent)`       | `on_progress(&snapshot)`        |
/// | `Err(DownloadError)`      | `on_error(&err)` then stops     |
/// | Channel closed (no error) | `on_complete(&final_snapshot)`  |
pub struct ProgressNotifier {
    observers: Vec<Box<dyn ProgressObserver>>,
    snapshot: ProgressSnapshot,
    start_time: Instant,
}

impl ProgressNotifier {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            snapshot: ProgressSnapshot::empty(),
            start_time: Instant::now(),
        }
    }

    /// Register an observer. Must be called before `run()`.
    pub fn add_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    /// Consume progress messages until the channel closes or an error arrives.
    pub async fn run(mut self, mut progress_rx: mpsc::Receiver<Result<ProgressEvent, DownloadError>>) {
        self.start_time = Instant::now();
        while let Some(msg) = progress_rx.recv().await {
            match msg {
                Ok(ev) => {
                    self.handle_event(ev);
                    for observer in &self.observers {
                        observer.on_progress(&self.snapshot).await;
                    }
                }
                Err(error) => {
                    for observer in &self.observers {
                        observer.on_error(&error).await;
                    }
                    return;
                }
            }
        }
        self.finish().await;
    }

    fn handle_event(&mut self, ev: ProgressEvent) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        // Steps only move forward; a stale event never rewinds the snapshot.
        if ev.step < self.snapshot.steps_completed {
            return;
        }
        self.snapshot = ProgressSnapshot {
            eta_secs: estimate_eta(ev.step, ev.total_steps, elapsed),
            download_id: ev.download_id,
            steps_completed: ev.step,
            total_steps: ev.total_steps,
            percent: ev.progress,
            elapsed_secs: elapsed,
            done: false,
        };
    }

    async fn finish(mut self) {
        self.snapshot.done = true;
        self.snapshot.elapsed_secs = self.start_time.elapsed().as_secs_f64();
        self.snapshot.eta_secs = 0.0;

        for observer in &self.observers {
            observer.on_complete(&self.snapshot).await;
        }
    }
}

impl Default for ProgressNotifier {
    fn default() -> Self {
        Self::new()
    }
}
