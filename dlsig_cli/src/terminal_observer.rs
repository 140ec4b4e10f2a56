use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use dlsig_core::{DownloadError, ProgressObserver, ProgressSnapshot};

/// Renders download progress as a single indicatif bar, one tick per step.
pub struct TerminalProgressObserver {
    bar: ProgressBar,
}

impl TerminalProgressObserver {
    pub fn new(total_steps: u32) -> Self {
        let style = ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos}/{len} steps ETA {eta} — {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        let bar = ProgressBar::new(total_steps.max(1) as u64);
        bar.set_style(style);
        bar.set_message("0%");
        Self { bar }
    }
}

#[async_trait]
impl ProgressObserver for TerminalProgressObserver {
    async fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total_steps.max(1) as u64);
        self.bar.set_position(snapshot.steps_completed as u64);
        self.bar.set_message(format!("{}%", snapshot.percent));
    }

    async fn on_complete(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_position(snapshot.steps_completed as u64);
        self.bar
            .finish_with_message(format!("Complete: {}% in {:.1}s", snapshot.percent, snapshot.elapsed_secs));
    }

    async fn on_error(&self, error: &DownloadError) {
        self.bar.abandon_with_message(format!("Failed: {}", error));
    }
}
