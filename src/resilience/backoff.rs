//! Delay schedules between poll attempts.

use std::time::Duration;
use rand::Rng;

use crate::config::{DelayStrategy, PollConfig};

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}

/// How long to wait after a given attempt before producing again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDelay {
    Fixed(Duration),
    Exponential { base_ms: u64, max_ms: u64 },
}

impl PollDelay {
    /// Delay after `attempt` (1-based) has completed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            PollDelay::Fixed(delay) => delay,
            PollDelay::Exponential { base_ms, max_ms } => calculate_backoff(attempt, base_ms, max_ms),
        }
    }
}

impl From<&PollConfig> for PollDelay {
    fn from(config: &PollConfig) -> Self {
        match config.strategy {
            DelayStrategy::Fixed => PollDelay::Fixed(Duration::from_millis(config.interval_ms)),
            DelayStrategy::Exponential => PollDelay::Exponential {
                base_ms: config.interval_ms,
                max_ms: config.max_interval_ms,
            },
        }
    }
}
