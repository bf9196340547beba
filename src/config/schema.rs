//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the transaction engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Approval polling behaviour.
    pub poll: PollConfig,

    /// Deadlines for calls to the custodial manager.
    pub timeouts: TimeoutConfig,

    /// Bank partner settings.
    pub banking: BankingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Delay strategy between poll attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayStrategy {
    /// Wait `interval_ms` between every attempt.
    Fixed,
    /// Double the delay each attempt starting from `interval_ms`, capped at `max_interval_ms`.
    Exponential,
}

/// Approval polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    /// Maximum number of produce calls per poll session.
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds (base delay for exponential).
    pub interval_ms: u64,

    /// Fixed or exponential delay.
    pub strategy: DelayStrategy,

    /// Upper bound for exponential delay in milliseconds.
    pub max_interval_ms: u64,

    /// Overall deadline for a poll session in seconds. `None` relies on `max_attempts` alone.
    pub timeout_secs: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval_ms: 5000,
            strategy: DelayStrategy::Fixed,
            max_interval_ms: 60_000,
            timeout_secs: Some(150),
        }
    }
}

/// Timeout configuration for custodial manager calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Transfer limits and fee lookups, in seconds.
    pub limits_secs: u64,

    /// Transfer submission, in seconds.
    pub submission_secs: u64,

    /// Charge and linked bank lookups during post-execute, in seconds.
    pub lookup_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            limits_secs: 10,
            submission_secs: 30,
            lookup_secs: 10,
        }
    }
}

/// Bank partner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BankingConfig {
    /// Base URL the bank redirects back to after open-banking authorisation.
    pub callback_base_url: String,
}

impl Default for BankingConfig {
    fn default() -> Self {
        Self {
            callback_base_url: "https://wallet.example.com/open-banking".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Include span targets in log lines.
    pub with_target: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            with_target: false,
        }
    }
}
