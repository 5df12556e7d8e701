//! Pipeline configuration.
//!
//! Covers the model used for injection, the per-item retry budget, the
//! worker pool size, an optional per-item deadline, and the oracle's
//! interpreter and timeout.

use std::time::Duration;
use thiserror::Error;

use crate::injection::DEFAULT_MODEL;
use crate::oracle::{DEFAULT_INTERPRETER, DEFAULT_TIMEOUT};

/// Default number of generate-validate attempts per problem.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default number of per-item pipelines in flight.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for a bug generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Model asked to inject bugs.
    pub model: String,
    /// Generate-validate attempts per problem before giving up.
    pub max_attempts: u32,
    /// Maximum number of problems processed concurrently.
    pub max_workers: usize,
    /// Deadline for one problem's whole retry loop; `None` waits indefinitely.
    pub item_timeout: Option<Duration>,
    /// Execution limit for one candidate in the oracle.
    pub oracle_timeout: Duration,
    /// Interpreter the oracle runs candidates with.
    pub python: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_workers: DEFAULT_MAX_WORKERS,
            item_timeout: None,
            oracle_timeout: DEFAULT_TIMEOUT,
            python: DEFAULT_INTERPRETER.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model cannot be empty".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.max_workers == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_workers must be greater than 0".to_string(),
            ));
        }

        if self.item_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ValidationFailed(
                "item_timeout must be greater than 0 when set".to_string(),
            ));
        }

        if self.oracle_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "oracle_timeout must be greater than 0".to_string(),
            ));
        }

        if self.python.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "python interpreter cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method to set the retry budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Builder method to set the worker count.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Builder method to set the per-item deadline.
    pub fn with_item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.item_timeout = timeout;
        self
    }

    /// Builder method to set the oracle timeout.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Builder method to set the oracle interpreter.
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }
}

/// Converts fractional seconds into a duration, rejecting negatives and NaN.
pub fn parse_seconds(secs: f64, key: &str) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{}' is not a valid number of seconds", secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.item_timeout, None);
        assert_eq!(config.oracle_timeout, Duration::from_secs(3));
        assert_eq!(config.python, "python3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new()
            .with_model("openai/gpt-4o")
            .with_max_attempts(5)
            .with_max_workers(2)
            .with_item_timeout(Some(Duration::from_secs(60)))
            .with_oracle_timeout(Duration::from_millis(1500))
            .with_python("/usr/bin/python3.12");

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.item_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.oracle_timeout, Duration::from_millis(1500));
        assert_eq!(config.python, "/usr/bin/python3.12");
    }

    #[test]
    fn test_validation_rejects_zero_budget_and_workers() {
        let err = PipelineConfig::new().with_max_attempts(0).validate();
        assert!(matches!(err, Err(ConfigError::ValidationFailed(msg)) if msg.contains("max_attempts")));

        let err = PipelineConfig::new().with_max_workers(0).validate();
        assert!(matches!(err, Err(ConfigError::ValidationFailed(msg)) if msg.contains("max_workers")));
    }

    #[test]
    fn test_validation_rejects_empty_strings_and_zero_timeouts() {
        assert!(PipelineConfig::new().with_model("  ").validate().is_err());
        assert!(PipelineConfig::new().with_python("").validate().is_err());
        assert!(PipelineConfig::new()
            .with_oracle_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(PipelineConfig::new()
            .with_item_timeout(Some(Duration::ZERO))
            .validate()
            .is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(
            parse_seconds(2.5, "--oracle-timeout").expect("valid"),
            Duration::from_millis(2500)
        );
        let err = parse_seconds(-1.0, "--oracle-timeout").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "--oracle-timeout"));
        assert!(parse_seconds(f64::NAN, "--oracle-timeout").is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "BUGFORGE_MAX_WORKERS".to_string(),
            message: "could not parse 'x'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for BUGFORGE_MAX_WORKERS: could not parse 'x'"
        );
    }
}
