//! Deterministic backoff schedule for enrichment retries.

use std::time::Duration;

/// Doubling-with-cap delay schedule. Attempts are numbered from 1; the delay
/// after attempt n is `initial_delay * 2^(n-1)`, capped at `max_delay`. No
/// jitter, so the sequence is fully determined by the attempt number.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffSchedule {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay.as_secs_f64() * 2f64.powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}
