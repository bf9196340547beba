//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0)
//! - Check the callback base URL parses as an http(s) URL with a host
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EngineConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use url::Url;

use crate::config::schema::{DelayStrategy, EngineConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `poll.max_attempts`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a parsed configuration.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let poll = &config.poll;
    if poll.max_attempts == 0 {
        errors.push(ValidationError::new("poll.max_attempts", "must be at least 1"));
    }
    if poll.strategy == DelayStrategy::Exponential && poll.max_interval_ms < poll.interval_ms {
        errors.push(ValidationError::new(
            "poll.max_interval_ms",
            "must not be smaller than poll.interval_ms",
        ));
    }
    if poll.timeout_secs == Some(0) {
        errors.push(ValidationError::new("poll.timeout_secs", "must be greater than 0 when set"));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.limits_secs", timeouts.limits_secs),
        ("timeouts.submission_secs", timeouts.submission_secs),
        ("timeouts.lookup_secs", timeouts.lookup_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    let raw = &config.banking.callback_base_url;
    match Url::parse(raw) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::new(
                "banking.callback_base_url",
                format!("'{}' is not an http(s) URL", raw),
            ));
        }
        Ok(url) if url.host_str().map_or(true, str::is_empty) => {
            errors.push(ValidationError::new(
                "banking.callback_base_url",
                format!("'{}' has no host", raw),
            ));
        }
        Ok(_) => {}
        Err(e) => {
            errors.push(ValidationError::new(
                "banking.callback_base_url",
                format!("'{}' is not a valid URL: {}", raw, e),
            ));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = EngineConfig::default();
        config.poll.max_attempts = 0;
        config.timeouts.submission_secs = 0;
        config.banking.callback_base_url = "ftp://nope".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "poll.max_attempts",
                "timeouts.submission_secs",
                "banking.callback_base_url",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_callback_base_url_needs_scheme_and_host() {
        for bad in ["http://", "https://  not a host", "https://exa mple.com/%%", "wallet.test/ob"] {
            let mut config = EngineConfig::default();
            config.banking.callback_base_url = bad.to_string();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors.len(), 1, "'{bad}'");
            assert_eq!(errors[0].field, "banking.callback_base_url");
        }

        let mut config = EngineConfig::default();
        config.banking.callback_base_url = "http://localhost:8080/open-banking".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_exponential_bounds() {
        let mut config = EngineConfig::default();
        config.poll.strategy = DelayStrategy::Exponential;
        config.poll.interval_ms = 1000;
        config.poll.max_interval_ms = 500;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "poll.max_interval_ms");
    }
}
