use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::config::DownloaderConfig;
use crate::downloader::worker::Downloader;
use crate::progress::notifier::ProgressNotifier;
use crate::progress::observer::ProgressObserver;
use crate::signal::{Lifetime, Observer, SignalProducer};
use crate::types::types::{DownloadError, DownloadOutcome, ManagerState, COMPLETE_PERCENT};

const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Owns at most one [`Downloader`] and reports its outcome through a cold signal.
///
/// The signal returned by [`DownloadManager::start`] carries a single terminal
/// outcome: the value `100` followed by completion, or a failure with
/// [`DownloadError::Cancelled`]. Per-step progress is not forwarded on the
/// signal; register a [`ProgressObserver`] to follow it.
///
/// Cloning yields another handle to the same manager.
#[derive(Clone)]
pub struct DownloadManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    config: DownloaderConfig,
    session: Mutex<Session>,
}

/// Everything that changes between runs, behind one lock.
struct Session {
    state: ManagerState,
    /// Incremented on every started run; outcomes from older runs are ignored.
    run: u64,
    /// `Some` only while `state == Running`.
    downloader: Option<Arc<Downloader>>,
    /// `Some` only between the signal starting and its terminal event.
    observer: Option<Observer<u8, DownloadError>>,
    lifetime: Option<Lifetime>,
    /// Observers waiting for the next run.
    notifier: ProgressNotifier,
    last_progress: u8,
    last_steps_completed: u32,
}

impl DownloadManager {
    pub fn new() -> Self {
        Self::with_config(DownloaderConfig::default())
    }

    pub fn with_config(config: DownloaderConfig) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                config,
                session: Mutex::new(Session {
                    state: ManagerState::Idle,
                    run: 0,
                    downloader: None,
                    observer: None,
                    lifetime: None,
                    notifier: ProgressNotifier::new(),
                    last_progress: 0,
                    last_steps_completed: 0,
                }),
            }),
        }
    }

    pub fn builder() -> DownloadManagerBuilder {
        DownloadManagerBuilder::new()
    }

    /// Register a progress observer for the next run.
    pub fn add_observer(&self, observer: Box<dyn ProgressObserver>) {
        self.inner.session().notifier.add_observer(observer);
    }

    /// Returns a cold producer. Nothing happens until it is started; starting
    /// it creates and launches a fresh downloader.
    ///
    /// Starting must happen inside a tokio runtime, otherwise the signal fails
    /// with [`DownloadError::Runtime`]. Starting while another run is active
    /// fails the new signal with [`DownloadError::AlreadyRunning`].
    pub fn start(&self) -> SignalProducer<u8, DownloadError> {
        let inner = Arc::clone(&self.inner);
        SignalProducer::new(move |observer, lifetime| inner.begin(observer, lifetime))
    }

    /// Ask the active downloader to stop. No-op when nothing is running.
    pub fn stop(&self) {
        self.inner.stop_run(None);
    }

    pub fn state(&self) -> ManagerState {
        self.inner.session().state
    }

    pub fn config(&self) -> DownloaderConfig {
        self.inner.config
    }

    /// Progress of the active run, or of the last finished run.
    pub fn progress(&self) -> u8 {
        let session = self.inner.session();
        match &session.downloader {
            Some(downloader) => downloader.progress(),
            None => session.last_progress,
        }
    }

    pub fn steps_completed(&self) -> u32 {
        let session = self.inner.session();
        match &session.downloader {
            Some(downloader) => downloader.steps_completed(),
            None => session.last_steps_completed,
        }
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerInner {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start handler of the producer returned by `start()`.
    fn begin(self: Arc<Self>, observer: Observer<u8, DownloadError>, lifetime: Lifetime) {
        let mut session = self.session();
        if session.state == ManagerState::Running {
            drop(session);
            log::warn!("[DownloadManager] start refused: a download is already running");
            observer.send_failed(DownloadError::AlreadyRunning);
            return;
        }
        log::info!("[DownloadManager] Download Starting");

        let downloader = Arc::new(Downloader::new(self.config));
        let notifier = std::mem::take(&mut session.notifier);
        let progress_rx = if notifier.has_observers() {
            let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
            downloader.set_progress_tx(tx);
            Some(rx)
        } else {
            None
        };

        // The observer is registered before the downloader can report anything.
        let previous_state = session.state;
        session.run += 1;
        let run = session.run;
        session.state = ManagerState::Running;
        session.downloader = Some(Arc::clone(&downloader));
        session.observer = Some(observer.clone());
        session.lifetime = Some(lifetime.clone());

        let outcome_rx = match downloader.launch() {
            Ok(rx) => rx,
            Err(error) => {
                log::error!("[DownloadManager] could not launch downloader: {}", error);
                session.state = previous_state;
                session.downloader = None;
                session.observer = None;
                session.lifetime = None;
                session.notifier = notifier;
                drop(session);
                observer.send_failed(error);
                return;
            }
        };
        drop(session);

        log::info!("[DownloadManager] run {} started downloader {}", run, downloader.id());
        if let Some(rx) = progress_rx {
            tokio::spawn(notifier.run(rx));
        }
        tokio::spawn(self.await_outcome(run, outcome_rx, lifetime));
    }

    async fn await_outcome(
        self: Arc<Self>,
        run: u64,
        mut outcome_rx: oneshot::Receiver<DownloadOutcome>,
        lifetime: Lifetime,
    ) {
        let outcome = tokio::select! {
            outcome = &mut outcome_rx => outcome,
            _ = lifetime.ended() => {
                log::info!("[DownloadManager] signal disposed, stopping run {}", run);
                self.stop_run(Some(run));
                outcome_rx.await
            }
        };

        match outcome {
            Ok(DownloadOutcome::Finished) => self.finished(run),
            Ok(DownloadOutcome::Canceled) => self.canceled(run),
            Err(_) => {
                log::error!("[DownloadManager] run {} ended without an outcome", run);
                self.canceled(run);
            }
        }
    }

    fn stop_run(&self, run: Option<u64>) {
        log::info!("[DownloadManager] IN");
        let downloader = {
            let session = self.session();
            match run {
                Some(run) if run != session.run => None,
                _ => session.downloader.clone(),
            }
        };
        match downloader {
            Some(downloader) => downloader.request_stop(),
            None => log::debug!("[DownloadManager] stop ignored: no active download"),
        }
        log::info!("[DownloadManager] OUT");
    }

    /// Close out `run`, moving to `terminal`. Returns the observer to notify,
    /// or `None` when the run has nothing left to report to.
    fn terminate(&self, run: u64, terminal: ManagerState) -> Option<Observer<u8, DownloadError>> {
        let mut session = self.session();
        if session.run != run {
            log::warn!("[DownloadManager] outcome of stale run {} ignored", run);
            return None;
        }
        let observer = session.observer.take()?;
        if let Some(downloader) = session.downloader.take() {
            session.last_progress = downloader.progress();
            session.last_steps_completed = downloader.steps_completed();
        }
        session.lifetime = None;
        session.state = terminal;
        Some(observer)
    }

    fn finished(&self, run: u64) {
        log::info!("[DownloadManager] IN");
        let Some(observer) = self.terminate(run, ManagerState::Succeeded) else {
            // Double termination, or a race with teardown.
            log::warn!("[DownloadManager] Error: Observer not found");
            return;
        };
        if !observer.send_value(COMPLETE_PERCENT) || !observer.send_completed() {
            log::debug!("[DownloadManager] run {} completed with no one listening", run);
        }
        log::info!("[DownloadManager] OUT");
    }

    fn canceled(&self, run: u64) {
        log::info!("[DownloadManager] IN");
        let Some(observer) = self.terminate(run, ManagerState::Cancelled) else {
            log::warn!("[DownloadManager] Error: Observer not found");
            return;
        };
        if !observer.send_failed(DownloadError::Cancelled) {
            log::debug!("[DownloadManager] run {} cancelled with no one listening", run);
        }
        log::info!("[DownloadManager] OUT");
    }
}

/// Consuming builder for [`DownloadManager`].
pub struct DownloadManagerBuilder {
    config: DownloaderConfig,
}

impl DownloadManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: DownloaderConfig::default(),
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.config = DownloaderConfig::new(steps, self.config.step_delay);
        self
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.config.step_delay = step_delay;
        self
    }

    pub fn with_config(mut self, config: DownloaderConfig) -> Self {
        self.config = DownloaderConfig::new(config.steps, config.step_delay);
        self
    }

    pub fn build(self) -> DownloadManager {
        DownloadManager::with_config(self.config)
    }
}

impl Default for DownloadManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
