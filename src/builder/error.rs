//! Build errors for the machine builder.

use crate::retry::ConfigError;
use thiserror::Error;

/// Errors that can occur when building state machines.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No transitions defined. Add at least one with .transition() or .allow()")]
    NoTransitions,

    #[error("Retry configuration rejected: {0}")]
    InvalidRetryConfig(#[from] ConfigError),
}
