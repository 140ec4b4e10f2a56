use serde::Serialize;

/// Aggregate progress of one download run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub download_id: String,
    pub steps_completed: u32,
    pub total_steps: u32,
    pub percent: u8,
    pub elapsed_secs: f64,
    pub eta_secs: f64,
    pub done: bool,
}

impl ProgressSnapshot {
    pub fn empty() -> Self {
        Self {
            download_id: String::new(),
            steps_completed: 0,
            total_steps: 0,
            percent: 0,
            elapsed_secs: 0.0,
            eta_secs: 0.0,
            done: false,
        }
    }
}

/// Estimate the remaining time from the average step duration so far.
pub fn estimate_eta(steps_completed: u32, total_steps: u32, elapsed_secs: f64) -> f64 {
    if steps_completed == 0 {
        return 0.0;
    }
    let remaining = total_steps.saturating_sub(steps_completed) as f64;
    remaining * (elapsed_secs / steps_completed as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_uses_average_step_time() {
        assert_eq!(estimate_eta(2, 10, 4.0), 16.0);
        assert_eq!(estimate_eta(10, 10, 9.0), 0.0);
    }

    #[test]
    fn eta_is_zero_before_first_step() {
        assert_eq!(estimate_eta(0, 10, 3.0), 0.0);
    }
}
