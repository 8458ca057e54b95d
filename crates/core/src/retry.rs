//! Backoff schedule for retrying model calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry schedule for transient completion failures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1_000,
            max_delay_ms: 300_000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Whether another attempt may follow failed attempt number `attempt`
    /// (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Wait before the attempt that follows failed attempt `attempt`
    /// (1-based): `initial * multiplier^(attempt - 1)`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let raw = self.initial_delay_ms as f64 * self.multiplier.max(1.0).powi(exponent);
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}
