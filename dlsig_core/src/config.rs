use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of simulated steps per download.
pub const DEFAULT_STEPS: u32 = 10;

/// Default pause before each simulated step.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Timing of the simulated download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloaderConfig {
    pub steps: u32,
    pub step_delay: Duration,
}

impl DownloaderConfig {
    pub fn new(steps: u32, step_delay: Duration) -> Self {
        Self {
            steps: steps.max(1),
            step_delay,
        }
    }

    /// Progress percentage after `step` of `steps` have completed.
    /// The last step always reads exactly 100.
    pub fn percent_at(&self, step: u32) -> u8 {
        let steps = self.steps.max(1) as u64;
        let step = (step as u64).min(steps);
        (step * 100 / steps) as u8
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }
}
