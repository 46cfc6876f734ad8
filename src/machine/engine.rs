//! The transition engine.

use crate::core::{Hook, Stage, State};
use crate::machine::error::TransitionError;
use crate::machine::event::TransitionEvent;
use crate::machine::handler::{noop, Handler, HandlerResult};
use crate::machine::registry::{Hooks, Registry};
use crate::retry::{RetryPolicy, StopSignal};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, debug_span, warn};
use uuid::Uuid;

struct Inner<S: State, A: Send + Sync + 'static> {
    id: Uuid,
    current: Mutex<S>,
    registry: RwLock<Registry<S, A>>,
    hooks: RwLock<Hooks<S, A>>,
    policy: RetryPolicy,
    stop: StopSignal,
}

/// A finite state machine with staged handlers.
///
/// `Machine` is a handle: clones refer to the same machine. Handlers receive
/// a handle through their [`TransitionEvent`], which is how a handler can
/// start a follow-up transition.
///
/// `A` is the type of the positional arguments passed to [`transit`]. It
/// defaults to [`serde_json::Value`] for heterogeneous argument lists.
///
/// Transitions run synchronously on the calling thread. The machine does not
/// serialize concurrent `transit` calls; drive a given machine from one place
/// at a time.
///
/// [`transit`]: Machine::transit
pub struct Machine<S: State, A: Send + Sync + 'static = Value> {
    inner: Arc<Inner<S, A>>,
}

impl<S: State, A: Send + Sync + 'static> Clone for Machine<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State, A: Send + Sync + 'static> std::fmt::Debug for Machine<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.inner.id)
            .field("current", &*self.inner.current.lock())
            .field("policy", &self.inner.policy)
            .finish()
    }
}

impl<S: State, A: Send + Sync + 'static> Machine<S, A> {
    /// Create a new machine in the initial state
    pub fn new(initial: S, policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                current: Mutex::new(initial),
                registry: RwLock::new(Registry::new()),
                hooks: RwLock::new(Hooks::new()),
                policy,
                stop: StopSignal::new(),
            }),
        }
    }

    /// Identifier used to tell machines apart in logs
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Get current state
    pub fn current_state(&self) -> S {
        self.inner.current.lock().clone()
    }

    /// Check if machine is in a final state
    pub fn is_final(&self) -> bool {
        self.inner.current.lock().is_final()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    pub(crate) fn stop_signal(&self) -> &StopSignal {
        &self.inner.stop
    }

    /// Whether `to` is reachable from the current state in one transition.
    pub fn can_transition(&self, to: &S) -> bool {
        let current = self.current_state();
        self.inner.registry.read().is_legal(&current, to)
    }

    /// Register `handler` at `stage` for the transition from each of
    /// `sources` to `to`.
    ///
    /// Handlers for the same (source, destination, stage) run in the order
    /// they were registered. Registering the same handler twice runs it twice.
    pub fn register<I, F>(&self, sources: I, to: S, stage: Stage, handler: F)
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(sources, to, stage, Arc::new(handler));
    }

    pub(crate) fn register_handler<I>(&self, sources: I, to: S, stage: Stage, handler: Handler<S, A>)
    where
        I: IntoIterator<Item = S>,
    {
        let mut registry = self.inner.registry.write();
        for from in sources {
            registry.register(from, to.clone(), stage, Arc::clone(&handler));
        }
    }

    pub fn on_before<I, F>(&self, sources: I, to: S, handler: F)
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(sources, to, Stage::Before, handler);
    }

    pub fn on_in_progress<I, F>(&self, sources: I, to: S, handler: F)
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(sources, to, Stage::InProgress, handler);
    }

    pub fn on_after<I, F>(&self, sources: I, to: S, handler: F)
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(sources, to, Stage::After, handler);
    }

    /// Declare a legal transition whose work is done by `handler`.
    pub fn add_transition<I, F>(&self, sources: I, to: S, handler: F)
    where
        I: IntoIterator<Item = S>,
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_in_progress(sources, to, handler);
    }

    /// Declare a legal transition with no in-progress work of its own.
    pub fn allow<I>(&self, sources: I, to: S)
    where
        I: IntoIterator<Item = S>,
    {
        self.on_in_progress(sources, to, noop::<S, A>);
    }

    /// Install the hook run before every transition, replacing any previous one.
    pub fn set_before_all<F>(&self, handler: F)
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.set_hook(Hook::BeforeAll, Some(Arc::new(handler)));
    }

    /// Install the hook run after in-progress handlers and before the commit.
    pub fn set_finalize<F>(&self, handler: F)
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.set_hook(Hook::Finalize, Some(Arc::new(handler)));
    }

    /// Install the hook run after every successful transition.
    pub fn set_after_all<F>(&self, handler: F)
    where
        F: Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static,
    {
        self.set_hook(Hook::AfterAll, Some(Arc::new(handler)));
    }

    /// Remove all three hooks.
    pub fn clear_hooks(&self) {
        let mut hooks = self.inner.hooks.write();
        for hook in [Hook::BeforeAll, Hook::Finalize, Hook::AfterAll] {
            hooks.set(hook, None);
        }
    }

    pub(crate) fn set_hook(&self, hook: Hook, handler: Option<Handler<S, A>>) {
        self.inner.hooks.write().set(hook, handler);
    }

    /// Wake any retry loop currently waiting on this machine.
    ///
    /// The signal is not remembered: a loop that starts waiting afterwards
    /// does not see it.
    pub fn stop(&self) {
        debug!(machine = %self.inner.id, "Stop signal fired");
        self.inner.stop.fire();
    }

    /// Move to `to`, running every registered handler.
    ///
    /// Order: before-all hook, before handlers, in-progress handlers,
    /// finalize hook, commit, after handlers, after-all hook. A failure
    /// before the commit aborts the transition and leaves the state as it
    /// was; after the commit failures are logged and otherwise ignored.
    pub fn transit(&self, to: S, args: impl Into<Arc<[A]>>) -> Result<(), TransitionError> {
        let args = args.into();
        let from = self.current_state();

        let span = debug_span!(
            "transit",
            machine = %self.inner.id,
            from = from.name(),
            to = to.name()
        );
        let _entered = span.enter();

        let plan = self.inner.registry.read().plan(&from, &to);
        let Some(plan) = plan else {
            debug!("Rejected illegal transition");
            return Err(TransitionError::IllegalTransition {
                from: from.name().to_string(),
                to: to.name().to_string(),
            });
        };
        let hooks = self.inner.hooks.read().clone();

        let dispatch = Dispatch {
            machine: self,
            from: &from,
            to: &to,
            args: &args,
        };

        dispatch.hook(Hook::BeforeAll, hooks.get(Hook::BeforeAll))?;
        dispatch.stage(Stage::Before, &plan.before)?;
        dispatch.stage(Stage::InProgress, &plan.in_progress)?;
        dispatch.hook(Hook::Finalize, hooks.get(Hook::Finalize))?;

        *self.inner.current.lock() = to.clone();
        debug!("Committed transition");

        dispatch.stage(Stage::After, &plan.after)?;
        dispatch.hook(Hook::AfterAll, hooks.get(Hook::AfterAll))?;

        Ok(())
    }
}

/// Per-call context shared by the dispatch steps of one transition.
struct Dispatch<'a, S: State, A: Send + Sync + 'static> {
    machine: &'a Machine<S, A>,
    from: &'a S,
    to: &'a S,
    args: &'a Arc<[A]>,
}

impl<S: State, A: Send + Sync + 'static> Dispatch<'_, S, A> {
    fn event(&self, stage: Stage) -> TransitionEvent<S, A> {
        TransitionEvent {
            machine: self.machine.clone(),
            stage,
            from: self.from.clone(),
            to: self.to.clone(),
            args: Arc::clone(self.args),
            entered_at: Utc::now(),
        }
    }

    fn stage(&self, stage: Stage, handlers: &[Handler<S, A>]) -> Result<(), TransitionError> {
        if handlers.is_empty() {
            return Ok(());
        }

        let event = self.event(stage);
        for (index, handler) in handlers.iter().enumerate() {
            let Err(source) = handler(&event) else {
                continue;
            };

            if !stage.aborts_on_failure() {
                warn!(%stage, index, error = %source, "Handler failed after commit");
                continue;
            }

            debug!(%stage, index, error = %source, "Handler failed, transition aborted");
            return Err(TransitionError::HandlerFailed {
                stage,
                from: self.from.name().to_string(),
                to: self.to.name().to_string(),
                source,
            });
        }

        Ok(())
    }

    fn hook(&self, hook: Hook, handler: Option<&Handler<S, A>>) -> Result<(), TransitionError> {
        let Some(handler) = handler else {
            return Ok(());
        };

        let stage = hook.stage();
        match handler(&self.event(stage)) {
            Ok(()) => Ok(()),
            Err(source) if stage.aborts_on_failure() => {
                debug!(%hook, error = %source, "Hook failed, transition aborted");
                Err(TransitionError::HookFailed {
                    hook,
                    from: self.from.name().to_string(),
                    to: self.to.name().to_string(),
                    source,
                })
            }
            Err(source) => {
                warn!(%hook, error = %source, "Hook failed after commit");
                Ok(())
            }
        }
    }
}
