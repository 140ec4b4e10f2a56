//! Cancelable, progress-reporting download task coordinated through a cold
//! signal.
//!
//! [`DownloadManager::start`] returns a [`SignalProducer`]; starting it
//! launches a simulated [`Downloader`] on the tokio runtime. The signal ends
//! with either the value `100` and completion, or a failure carrying
//! [`DownloadError::Cancelled`] after [`DownloadManager::stop`].

pub mod config;
pub mod downloader;
pub mod manager;
pub mod progress;
pub mod signal;
pub mod types;

pub use config::DownloaderConfig;
pub use downloader::worker::Downloader;
pub use manager::download_manager::{DownloadManager, DownloadManagerBuilder};
pub use progress::{ProgressNotifier, ProgressObserver, ProgressSnapshot};
pub use signal::{Disposable, Lifetime, Observer, Signal, SignalEvent, SignalProducer};
pub use types::types::{DownloadError, DownloadOutcome, ManagerState, ProgressEvent};
