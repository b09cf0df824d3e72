//! Retry policy for backend calls and units of work
//!
//! Expressed as an explicit policy value rather than control-flow
//! decoration: the delay for an attempt is a pure function of the
//! attempt number, so the schedule can be tested without sleeping.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff policy.
///
/// Attempt numbering starts at 0; `delay_for(n)` is the pause taken
/// *after* attempt `n` fails and before attempt `n + 1` runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,

    /// Multiplier applied per subsequent attempt
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Ceiling on any single delay
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            multiplier: default_multiplier(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_secs() -> u64 {
    2
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_secs() -> u64 {
    60
}

impl RetryPolicy {
    /// Policy for whole-unit retries at the orchestrator boundary
    pub fn unit_default() -> Self {
        Self {
            max_attempts: 2,
            ..Self::default()
        }
    }

    /// Delay after failed attempt `attempt` (0-based), capped at
    /// `max_delay_secs`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_secs as f64 * self.multiplier.powi(attempt as i32);
        let capped = exp.min(self.max_delay_secs as f64);
        Duration::from_secs_f64(capped)
    }

    /// Whether another attempt is allowed after `attempt` failures
    pub fn has_attempts_left(&self, failures: u32) -> bool {
        failures < self.max_attempts
    }
}
