use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain reported by a cancelled download.
pub const CANCELLED_DOMAIN: &str = "Download Cancelled";

/// Stable code reported by a cancelled download.
pub const CANCELLED_CODE: u16 = 400;

/// Percentage reported on the stream when a download finishes.
pub const COMPLETE_PERCENT: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// The download was stopped before its last step completed.
    #[error("Download Cancelled (code 400)")]
    Cancelled,

    #[error("a download is already running on this manager")]
    AlreadyRunning,

    #[error("downloader {0} was already launched")]
    AlreadyLaunched(String),

    #[error("no async runtime to run the download on: {0}")]
    Runtime(String),
}

impl DownloadError {
    pub fn domain(&self) -> &'static str {
        match self {
            DownloadError::Cancelled => CANCELLED_DOMAIN,
            DownloadError::AlreadyRunning | DownloadError::AlreadyLaunched(_) => "Download Busy",
            DownloadError::Runtime(_) => "Download Runtime",
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            DownloadError::Cancelled => CANCELLED_CODE,
            DownloadError::AlreadyRunning | DownloadError::AlreadyLaunched(_) => 409,
            DownloadError::Runtime(_) => 500,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}

/// Terminal result of one downloader run. Exactly one is produced per launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadOutcome {
    Finished,
    Canceled,
}

/// Emitted by the downloader after every completed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub download_id: String,
    pub step: u32,
    pub total_steps: u32,
    pub progress: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerState {
    Idle,
    Running,
    Succeeded,
    Cancelled,
}

impl ManagerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ManagerState::Succeeded | ManagerState::Cancelled)
    }
}
