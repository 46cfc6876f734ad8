//! Errors returned by transitions.

use crate::core::{Hook, Stage};
use crate::machine::handler::BoxError;
use thiserror::Error;

/// Errors that can occur during transitions.
///
/// States are recorded by name so the error stays non-generic and can be
/// returned from a handler that chains into another transition.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Cannot transition from '{from}' to '{to}'")]
    IllegalTransition { from: String, to: String },

    #[error("{stage} handler failed transitioning from '{from}' to '{to}': {source}")]
    HandlerFailed {
        stage: Stage,
        from: String,
        to: String,
        #[source]
        source: BoxError,
    },

    #[error("{hook} hook failed transitioning from '{from}' to '{to}': {source}")]
    HookFailed {
        hook: Hook,
        from: String,
        to: String,
        #[source]
        source: BoxError,
    },

    #[error("Gave up transitioning from '{from}' to '{to}' after {attempts} attempts: {last}")]
    RetriesExhausted {
        from: String,
        to: String,
        attempts: usize,
        #[source]
        last: Box<TransitionError>,
    },

    /// A retry loop was stopped after at least one failed attempt. A loop
    /// stopped before anything failed returns `Ok(())` instead.
    #[error("Retrying the transition from '{from}' to '{to}' was cancelled: {last}")]
    Cancelled {
        from: String,
        to: String,
        #[source]
        last: Box<TransitionError>,
    },
}

impl TransitionError {
    /// The failure a handler or hook returned, looking through retry
    /// wrappers. `None` when the (last) failure was an illegal transition.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::HandlerFailed { source, .. } | Self::HookFailed { source, .. } => {
                Some(&**source)
            }
            Self::RetriesExhausted { last, .. } | Self::Cancelled { last, .. } => {
                last.handler_error()
            }
            Self::IllegalTransition { .. } => None,
        }
    }

    /// Last attempt's failure for retry outcomes.
    pub fn last_failure(&self) -> Option<&TransitionError> {
        match self {
            Self::RetriesExhausted { last, .. } | Self::Cancelled { last, .. } => Some(&**last),
            _ => None,
        }
    }

    pub fn is_illegal(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error, PartialEq)]
    #[error("disk full")]
    struct DiskFull;

    fn handler_failure() -> TransitionError {
        TransitionError::HandlerFailed {
            stage: Stage::InProgress,
            from: "idle".to_string(),
            to: "busy".to_string(),
            source: Box::new(DiskFull),
        }
    }

    #[test]
    fn handler_error_is_returned_unchanged() {
        let err = handler_failure();
        let inner = err.handler_error().unwrap();
        assert_eq!(inner.downcast_ref::<DiskFull>(), Some(&DiskFull));
        assert_eq!(
            err.to_string(),
            "in-progress handler failed transitioning from 'idle' to 'busy': disk full"
        );
    }

    #[test]
    fn retry_wrappers_expose_the_last_handler_error() {
        let err = TransitionError::RetriesExhausted {
            from: "idle".to_string(),
            to: "busy".to_string(),
            attempts: 4,
            last: Box::new(handler_failure()),
        };

        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "Gave up transitioning from 'idle' to 'busy' after 4 attempts: \
             in-progress handler failed transitioning from 'idle' to 'busy': disk full"
        );
        assert!(err.last_failure().is_some());
        assert!(err.handler_error().unwrap().is::<DiskFull>());
    }

    #[test]
    fn cancellation_after_illegal_attempt_has_no_handler_error() {
        let err = TransitionError::Cancelled {
            from: "idle".to_string(),
            to: "wat".to_string(),
            last: Box::new(TransitionError::IllegalTransition {
                from: "idle".to_string(),
                to: "wat".to_string(),
            }),
        };

        assert!(err.is_cancelled());
        assert!(err.source().is_some());
        assert!(err.last_failure().unwrap().is_illegal());
        assert!(err.handler_error().is_none());
        assert_eq!(
            err.to_string(),
            "Retrying the transition from 'idle' to 'wat' was cancelled: \
             Cannot transition from 'idle' to 'wat'"
        );
    }

    #[test]
    fn illegal_transition_names_both_states() {
        let err = TransitionError::IllegalTransition {
            from: "idle".to_string(),
            to: "wat".to_string(),
        };

        assert!(err.is_illegal());
        assert_eq!(err.to_string(), "Cannot transition from 'idle' to 'wat'");
    }
}
