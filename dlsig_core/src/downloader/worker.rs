use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::DownloaderConfig;
use crate::types::types::{DownloadError, DownloadOutcome, ProgressEvent};

type ProgressMessage = Result<ProgressEvent, DownloadError>;
type ProgressSender = mpsc::Sender<ProgressMessage>;

/// Simulated download: `config.steps` steps, each preceded by `config.step_delay`.
///
/// One instance runs at most once. The run reports exactly one
/// [`DownloadOutcome`] through the receiver returned by [`Downloader::launch`].
pub struct Downloader {
    id: String,
    config: DownloaderConfig,
    progress: Arc<AtomicU8>,
    steps_completed: Arc<AtomicU32>,
    stop_token: CancellationToken,
    launched: AtomicBool,
    progress_tx: Mutex<Option<ProgressSender>>,
}

impl Downloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            progress: Arc::new(AtomicU8::new(0)),
            steps_completed: Arc::new(AtomicU32::new(0)),
            stop_token: CancellationToken::new(),
            launched: AtomicBool::new(false),
            progress_tx: Mutex::new(None),
        }
    }

    /// Attach the channel that receives per-step events. Must be called before `launch()`.
    pub fn set_progress_tx(&self, tx: ProgressSender) {
        *self.progress_tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
    }

    /// Spawn the run on the current tokio runtime.
    pub fn launch(&self) -> Result<oneshot::Receiver<DownloadOutcome>, DownloadError> {
        let handle = Handle::try_current().map_err(|e| DownloadError::Runtime(e.to_string()))?;

        if self.launched.swap(true, Ordering::SeqCst) {
            return Err(DownloadError::AlreadyLaunched(self.id.clone()));
        }

        let run = StepRun {
            id: self.id.clone(),
            config: self.config,
            progress: Arc::clone(&self.progress),
            steps_completed: Arc::clone(&self.steps_completed),
            stop_token: self.stop_token.clone(),
            progress_tx: self
                .progress_tx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
            backlog: Vec::new(),
        };

        let (outcome_tx, outcome_rx) = oneshot::channel();
        log::info!("[Downloader] {} launching ({} steps)", self.id, self.config.steps);

        handle.spawn(async move {
            let id = run.id.clone();
            let outcome = run.execute().await;
            if outcome_tx.send(outcome).is_err() {
                log::debug!("[Downloader] {} outcome {:?} had no receiver", id, outcome);
            }
        });

        Ok(outcome_rx)
    }

    /// Ask the run to halt at its next step boundary. Idempotent, never blocks.
    pub fn request_stop(&self) {
        if !self.stop_token.is_cancelled() {
            log::info!("[Downloader] {} stop requested", self.id);
        }
        self.stop_token.cancel();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> DownloaderConfig {
        self.config
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn steps_completed(&self) -> u32 {
        self.steps_completed.load(Ordering::SeqCst)
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_token.is_cancelled()
    }

    pub fn is_launched(&self) -> bool {
        self.launched.load(Ordering::SeqCst)
    }
}

/// State moved into the spawned task.
struct StepRun {
    id: String,
    config: DownloaderConfig,
    progress: Arc<AtomicU8>,
    steps_completed: Arc<AtomicU32>,
    stop_token: CancellationToken,
    progress_tx: Option<ProgressSender>,
    /// Messages that must reach the observers but found the channel full.
    backlog: Vec<ProgressMessage>,
}

impl StepRun {
    async fn execute(mut self) -> DownloadOutcome {
        if self.stop_token.is_cancelled() {
            return self.cancel();
        }

        for step in 1..=self.config.steps {
            let stopped = tokio::select! {
                biased;
                _ = self.stop_token.cancelled() => true,
                _ = tokio::time::sleep(self.config.step_delay) => false,
            };
            if stopped {
                return self.cancel();
            }

            let percent = self.config.percent_at(step);
            self.progress.fetch_max(percent, Ordering::SeqCst);
            self.steps_completed.store(step, Ordering::SeqCst);
            log::debug!("[Downloader] {} Progress {}%", self.id, percent);

            let event = ProgressEvent {
                download_id: self.id.clone(),
                step,
                total_steps: self.config.steps,
                progress: percent,
            };
            // Intermediate steps may be dropped under backpressure, the last one may not.
            self.deliver(Ok(event), step == self.config.steps);

            if self.stop_token.is_cancelled() {
                return self.cancel();
            }
        }

        log::info!("[Downloader] {} finished", self.id);
        self.flush_backlog();
        DownloadOutcome::Finished
    }

    fn cancel(mut self) -> DownloadOutcome {
        log::info!(
            "[Downloader] {} canceled after {} of {} steps",
            self.id,
            self.steps_completed.load(Ordering::SeqCst),
            self.config.steps
        );
        self.deliver(Err(DownloadError::Cancelled), true);
        self.flush_backlog();
        DownloadOutcome::Canceled
    }

    /// Hand `msg` to the progress channel without ever waiting on it.
    fn deliver(&mut self, msg: ProgressMessage, required: bool) {
        let Some(tx) = &self.progress_tx else {
            return;
        };
        if !self.backlog.is_empty() {
            if required {
                self.backlog.push(msg);
            }
            return;
        }
        match tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) if required => self.backlog.push(msg),
            Err(TrySendError::Full(_)) => {
                log::debug!("[Downloader] {} progress channel full, event dropped", self.id);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Detach whatever is still owed to the observers so the outcome is not held up.
    /// Dropping the last sender afterwards closes the progress channel.
    fn flush_backlog(&mut self) {
        let Some(tx) = self.progress_tx.take() else {
            return;
        };
        if self.backlog.is_empty() {
            return;
        }
        let backlog = std::mem::take(&mut self.backlog);
        let id = self.id.clone();
        tokio::spawn(async move {
            for msg in backlog {
                if tx.send(msg).await.is_err() {
                    log::debug!("[Downloader] {} progress receiver gone", id);
                    return;
                }
            }
        });
    }
}
