//! Declarative retry configuration.
//!
//! Backoff is normally a caller-supplied function, but most callers want
//! one of a few standard shapes loaded from a config file. `RetryConfig`
//! describes those shapes and is validated with Stillwater's `Validation`,
//! so every problem in a config is reported at once.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Retry budget and backoff shape.
///
/// ```rust
/// use switchyard::retry::{BackoffConfig, RetryConfig};
///
/// let config = RetryConfig::from_json(
///     r#"{ "max_retries": 5, "backoff": { "kind": "exponential", "initial_ms": 10, "factor": 2.0, "max_ms": 1000 } }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.max_retries, 5);
/// assert!(matches!(config.backoff, BackoffConfig::Exponential { .. }));
/// assert!(config.validate().is_success());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: usize,

    pub backoff: BackoffConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Wait before each attempt, as a function of the attempt number (from 1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// Same wait every time.
    Constant { delay_ms: u64 },

    /// `initial_ms + step_ms * (attempt - 1)`, capped at `max_ms`.
    Linear {
        initial_ms: u64,
        step_ms: u64,
        max_ms: u64,
    },

    /// `initial_ms * factor^(attempt - 1)`, capped at `max_ms`.
    Exponential {
        initial_ms: u64,
        factor: f64,
        max_ms: u64,
    },
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::Constant { delay_ms: 100 }
    }
}

impl BackoffConfig {
    pub fn delay(&self, attempt: usize) -> Duration {
        let steps = attempt.saturating_sub(1);
        let millis = match *self {
            Self::Constant { delay_ms } => delay_ms,
            Self::Linear {
                initial_ms,
                step_ms,
                max_ms,
            } => initial_ms
                .saturating_add(step_ms.saturating_mul(steps as u64))
                .min(max_ms),
            Self::Exponential {
                initial_ms,
                factor,
                max_ms,
            } => {
                let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
                let scaled = initial_ms as f64 * factor.powi(exponent);
                scaled.min(max_ms as f64) as u64
            }
        };
        Duration::from_millis(millis)
    }
}

/// Problems found while validating a [`RetryConfig`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("Backoff factor must be a finite number of at least 1.0 (got {factor})")]
    InvalidFactor { factor: f64 },

    #[error("Initial delay ({initial_ms}ms) exceeds the cap ({max_ms}ms)")]
    InitialExceedsCap { initial_ms: u64, max_ms: u64 },

    #[error("Backoff cap must be greater than zero")]
    ZeroCap,
}

/// Errors that can occur when loading retry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse retry configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid retry configuration ({} violations)", .violations.len())]
    Invalid { violations: Vec<ConfigViolation> },
}

impl RetryConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

        match self.backoff {
            BackoffConfig::Constant { .. } => {}
            BackoffConfig::Linear {
                initial_ms, max_ms, ..
            } => {
                checks.push(check_cap(max_ms));
                checks.push(check_initial(initial_ms, max_ms));
            }
            BackoffConfig::Exponential {
                initial_ms,
                factor,
                max_ms,
            } => {
                checks.push(check_cap(max_ms));
                checks.push(check_initial(initial_ms, max_ms));
                checks.push(check_factor(factor));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate and convert into a list of violations on failure.
    pub(crate) fn ensure_valid(&self) -> Result<(), ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(ConfigError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}

fn check_cap(max_ms: u64) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    if max_ms == 0 {
        Validation::fail(ConfigViolation::ZeroCap)
    } else {
        Validation::success(())
    }
}

fn check_initial(initial_ms: u64, max_ms: u64) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    if initial_ms > max_ms {
        Validation::fail(ConfigViolation::InitialExceedsCap { initial_ms, max_ms })
    } else {
        Validation::success(())
    }
}

fn check_factor(factor: f64) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    if factor.is_finite() && factor >= 1.0 {
        Validation::success(())
    } else {
        Validation::fail(ConfigViolation::InvalidFactor { factor })
    }
}
