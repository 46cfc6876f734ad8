//! Retry budget and backoff schedule used by `transit_with_retries`.

use crate::retry::config::{ConfigError, RetryConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type BackoffFn = Arc<dyn Fn(usize) -> Duration + Send + Sync>;

/// How many times to retry and how long to wait before each attempt.
///
/// With `max_retries = R` a retry loop makes at most `R + 1` attempts.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    backoff: BackoffFn,
}

impl RetryPolicy {
    /// Policy with a caller-supplied backoff, called with the attempt number
    /// (starting at 1) before each attempt.
    pub fn new<F>(max_retries: usize, backoff: F) -> Self
    where
        F: Fn(usize) -> Duration + Send + Sync + 'static,
    {
        Self {
            max_retries,
            backoff: Arc::new(backoff),
        }
    }

    /// Same wait before every attempt.
    pub fn constant(max_retries: usize, delay: Duration) -> Self {
        Self::new(max_retries, move |_| delay)
    }

    /// Build a policy from validated configuration.
    pub fn from_config(config: &RetryConfig) -> Result<Self, ConfigError> {
        config.ensure_valid()?;
        let backoff = config.backoff.clone();
        Ok(Self::new(config.max_retries, move |attempt| {
            backoff.delay(attempt)
        }))
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Total attempts allowed, first try included.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }

    pub fn backoff(&self, attempt: usize) -> Duration {
        (self.backoff)(attempt)
    }

    pub(crate) fn allows_attempt(&self, attempt: usize) -> bool {
        attempt <= self.max_attempts()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::constant(3, Duration::from_millis(100))
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
