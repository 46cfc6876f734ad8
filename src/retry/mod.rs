//! Retrying transitions with backoff and cancellation.
//!
//! [`Machine::transit_with_retries`] repeats a single transition until it
//! succeeds, the [`RetryPolicy`] budget is spent, or [`Machine::stop`] fires.
//! It is the only suspension point in the crate: it waits on a tokio timer
//! and the machine's [`StopSignal`], whichever completes first.

mod config;
mod policy;
mod signal;

pub use config::{BackoffConfig, ConfigError, ConfigViolation, RetryConfig};
pub use policy::RetryPolicy;
pub use signal::StopSignal;

use crate::core::State;
use crate::machine::{Machine, TransitionError};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl<S: State, A: Send + Sync + 'static> Machine<S, A> {
    /// Attempt a transition until it succeeds, retrying on any failure.
    ///
    /// Before every attempt the loop waits `policy.backoff(attempt)`. If
    /// [`stop`](Machine::stop) fires during a wait the loop ends at once: with
    /// `Ok(())` when no attempt has failed yet, otherwise with
    /// [`TransitionError::Cancelled`] carrying the last failure. Once
    /// `max_retries + 1` attempts have failed it ends with
    /// [`TransitionError::RetriesExhausted`].
    ///
    /// `Ok(())` alone does not mean the transition happened; compare
    /// [`current_state`](Machine::current_state) if that matters.
    pub async fn transit_with_retries(
        &self,
        to: S,
        args: impl Into<Arc<[A]>>,
    ) -> Result<(), TransitionError> {
        let args = args.into();
        let policy = self.retry_policy();
        let mut last: Option<TransitionError> = None;
        let mut attempt = 1;

        loop {
            let wait = policy.backoff(attempt);

            tokio::select! {
                biased;

                _ = self.stop_signal().stopped() => {
                    info!(machine = %self.id(), to = to.name(), attempt, "Retry loop cancelled");
                    return match last {
                        None => Ok(()),
                        Some(err) => Err(TransitionError::Cancelled {
                            from: self.current_state().name().to_string(),
                            to: to.name().to_string(),
                            last: Box::new(err),
                        }),
                    };
                }
                _ = tokio::time::sleep(wait) => {}
            }

            // The first attempt is always allowed, so a spent budget has a failure.
            match last {
                Some(err) if !policy.allows_attempt(attempt) => {
                    warn!(
                        machine = %self.id(),
                        to = to.name(),
                        attempts = attempt - 1,
                        "Retry budget exhausted"
                    );
                    return Err(TransitionError::RetriesExhausted {
                        from: self.current_state().name().to_string(),
                        to: to.name().to_string(),
                        attempts: attempt - 1,
                        last: Box::new(err),
                    });
                }
                _ => {}
            }

            match self.transit(to.clone(), Arc::clone(&args)) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!(machine = %self.id(), attempt, error = %err, "Transition attempt failed");
                    last = Some(err);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{HandlerResult, TransitionEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("not yet")]
    struct NotYet;

    fn machine(max_retries: usize) -> Machine<&'static str, ()> {
        Machine::new(
            "start",
            RetryPolicy::constant(max_retries, Duration::from_millis(1)),
        )
    }

    fn counting_failure(
        counter: &Arc<AtomicUsize>,
        succeed_on: usize,
    ) -> impl Fn(&TransitionEvent<&'static str, ()>) -> HandlerResult + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_: &TransitionEvent<&'static str, ()>| -> HandlerResult {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt < succeed_on {
                Err(Box::new(NotYet))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let machine = machine(100);
        let calls = Arc::new(AtomicUsize::new(0));
        machine.allow(["start"], "end");
        machine.on_before(["start"], "end", counting_failure(&calls, 3));

        machine.transit_with_retries("end", Vec::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(machine.current_state(), "end");
    }

    #[tokio::test]
    async fn exhausts_after_max_retries_plus_one_attempts() {
        let machine = machine(4);
        let calls = Arc::new(AtomicUsize::new(0));
        machine.add_transition(["start"], "fail", counting_failure(&calls, usize::MAX));

        let err = machine.transit_with_retries("fail", Vec::new()).await.unwrap_err();
        match &err {
            TransitionError::RetriesExhausted {
                from, to, attempts, ..
            } => {
                assert_eq!(from, "start");
                assert_eq!(to, "fail");
                assert_eq!(*attempts, 5);
            }
            other => panic!("Expected RetriesExhausted, got {other:?}"),
        }
        assert!(err.handler_error().unwrap().is::<NotYet>());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(machine.current_state(), "start");
    }

    #[tokio::test]
    async fn illegal_transitions_are_retried_too() {
        let machine = machine(2);

        let err = machine.transit_with_retries("nowhere", Vec::new()).await.unwrap_err();
        assert!(err.last_failure().unwrap().is_illegal());
    }

    #[tokio::test]
    async fn backoff_sees_increasing_attempt_numbers() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let machine: Machine<&'static str, ()> = Machine::new(
            "start",
            RetryPolicy::new(2, move |attempt| {
                record.lock().push(attempt);
                Duration::from_millis(1)
            }),
        );
        machine.add_transition(["start"], "end", |_| Err(Box::new(NotYet)));

        assert!(machine.transit_with_retries("end", Vec::new()).await.is_err());
        assert_eq!(*seen.lock(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn stop_before_any_failure_ends_without_error() {
        let machine: Machine<&'static str, ()> =
            Machine::new("start", RetryPolicy::constant(10, Duration::from_secs(60)));
        machine.allow(["start"], "end");

        let looping = machine.clone();
        let task = tokio::spawn(async move { looping.transit_with_retries("end", Vec::new()).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        machine.stop();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("retry loop did not stop")
            .unwrap();
        assert!(result.is_ok());
        assert_eq!(machine.current_state(), "start");
    }

    #[tokio::test]
    async fn concurrent_stops_cancel_a_failing_loop_once() {
        let machine: Machine<&'static str, ()> = Machine::new(
            "start",
            RetryPolicy::new(10, |attempt| {
                if attempt == 1 {
                    Duration::ZERO
                } else {
                    Duration::from_secs(60)
                }
            }),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        machine.add_transition(["start"], "end", counting_failure(&calls, usize::MAX));

        let looping = machine.clone();
        let task = tokio::spawn(async move { looping.transit_with_retries("end", Vec::new()).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stoppers: Vec<_> = (0..8)
            .map(|_| {
                let machine = machine.clone();
                tokio::spawn(async move { machine.stop() })
            })
            .collect();
        for stopper in stoppers {
            stopper.await.unwrap();
        }

        let err = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("retry loop did not stop")
            .unwrap()
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.handler_error().unwrap().is::<NotYet>());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(machine.current_state(), "start");
    }

    #[tokio::test]
    async fn cancellation_reports_last_failure() {
        let machine: Machine<&'static str, ()> = Machine::new(
            "start",
            RetryPolicy::new(10, |attempt| {
                if attempt == 1 {
                    Duration::ZERO
                } else {
                    Duration::from_secs(60)
                }
            }),
        );
        machine.add_transition(["start"], "end", |_| Err(Box::new(NotYet)));

        let looping = machine.clone();
        let task = tokio::spawn(async move { looping.transit_with_retries("end", Vec::new()).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        machine.stop();
        machine.stop();

        let err = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("retry loop did not stop")
            .unwrap()
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.handler_error().unwrap().is::<NotYet>());
    }
}
