//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{Hook, Stage, State};
use crate::machine::{noop, Handler, HandlerResult, Machine, TransitionEvent};
use crate::retry::{RetryConfig, RetryPolicy};
use serde_json::Value;
use std::sync::Arc;

struct Registration<S: State, A: Send + Sync + 'static> {
    sources: Vec<S>,
    to: S,
    stage: Stage,
    handler: Handler<S, A>,
}

/// Builder for constructing state machines with a fluent API.
///
/// ```rust
/// use switchyard::builder::MachineBuilder;
///
/// let machine = MachineBuilder::<&str, ()>::new()
///     .initial("idle")
///     .allow(["idle"], "running")
///     .transition(["running"], "idle", |_| Ok(()))
///     .build()
///     .unwrap();
///
/// assert!(machine.can_transition(&"running"));
/// ```
pub struct MachineBuilder<S: State, A: Send + Sync + 'static = Value> {
    initial: Option<S>,
    policy: Option<RetryPolicy>,
    registrations: Vec<Registration<S, A>>,
    hooks: Vec<(Hook, Handler<S, A>)>,
}

impl<S: State, A: Send + Sync + 'static> MachineBuilder<S, A> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            policy: None,
            registrations: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the retry policy. Defaults to [`RetryPolicy::default`].
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the retry policy from configuration.
    /// Returns an error if the configuration fails validation.
    pub fn retry_config(mut self, config: &RetryConfig) -> Result<Self, BuildError> {
        self.policy = Some(RetryPolicy::from_config(config)?);
        Ok(self)
    }

    /// Register a handler at any stage.
    pub fn register<I, F>(mut self, sources: I, to: S, stage: Stage, handler: F) -> Self
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.registrations.push(Registration {
            sources: sources.into_iter().collect(),
            to,
            stage,
            handler: Arc::new(handler),
        });
        self
    }

    /// Add a legal transition with its in-progress handler.
    pub fn transition<I, F>(self, sources: I, to: S, handler: F) -> Self
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(sources, to, Stage::InProgress, handler)
    }

    /// Add a legal transition that does no in-progress work.
    pub fn allow<I>(self, sources: I, to: S) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        self.register(sources, to, Stage::InProgress, noop::<S, A>)
    }

    pub fn before<I, F>(self, sources: I, to: S, handler: F) -> Self
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(sources, to, Stage::Before, handler)
    }

    pub fn after<I, F>(self, sources: I, to: S, handler: F) -> Self
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(sources, to, Stage::After, handler)
    }

    pub fn before_all<F>(self, handler: F) -> Self
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.hook(Hook::BeforeAll, handler)
    }

    pub fn finalize<F>(self, handler: F) -> Self
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.hook(Hook::Finalize, handler)
    }

    pub fn after_all<F>(self, handler: F) -> Self
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.hook(Hook::AfterAll, handler)
    }

    fn hook<F>(mut self, hook: Hook, handler: F) -> Self
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.hooks.push((hook, Arc::new(handler)));
        self
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<Machine<S, A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if !self
            .registrations
            .iter()
            .any(|r| r.stage == Stage::InProgress && !r.sources.is_empty())
        {
            return Err(BuildError::NoTransitions);
        }

        let machine = Machine::new(initial, self.policy.unwrap_or_default());
        for registration in self.registrations {
            machine.register_handler(
                registration.sources,
                registration.to,
                registration.stage,
                registration.handler,
            );
        }
        for (hook, handler) in self.hooks {
            machine.set_hook(hook, Some(handler));
        }

        Ok(machine)
    }
}

impl<S: State, A: Send + Sync + 'static> Default for MachineBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
