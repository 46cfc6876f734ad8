//! Transition registry and the machine-wide hook slots.

use crate::core::{Hook, Stage, State};
use crate::machine::handler::Handler;
use std::collections::HashMap;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct TransitionKey<S> {
    from: S,
    to: S,
    stage: Stage,
}

/// Handlers for one (from, to) pair, copied out of the registry when a
/// transition starts.
pub(crate) struct TransitionPlan<S: State, A: Send + Sync + 'static> {
    pub(crate) before: Vec<Handler<S, A>>,
    pub(crate) in_progress: Vec<Handler<S, A>>,
    pub(crate) after: Vec<Handler<S, A>>,
}

pub(crate) struct Registry<S: State, A: Send + Sync + 'static> {
    handlers: HashMap<TransitionKey<S>, Vec<Handler<S, A>>>,
}

impl<S: State, A: Send + Sync + 'static> Registry<S, A> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Append a handler; lists are kept in registration order.
    pub(crate) fn register(&mut self, from: S, to: S, stage: Stage, handler: Handler<S, A>) {
        self.handlers
            .entry(TransitionKey { from, to, stage })
            .or_default()
            .push(handler);
    }

    /// A transition is legal only if something is registered in progress.
    pub(crate) fn is_legal(&self, from: &S, to: &S) -> bool {
        self.lookup(from, to, Stage::InProgress).is_some()
    }

    /// Snapshot the handlers for a legal transition, `None` if illegal.
    pub(crate) fn plan(&self, from: &S, to: &S) -> Option<TransitionPlan<S, A>> {
        let in_progress = self.lookup(from, to, Stage::InProgress)?.clone();

        Some(TransitionPlan {
            before: self.snapshot(from, to, Stage::Before),
            in_progress,
            after: self.snapshot(from, to, Stage::After),
        })
    }

    fn snapshot(&self, from: &S, to: &S, stage: Stage) -> Vec<Handler<S, A>> {
        self.lookup(from, to, stage).cloned().unwrap_or_default()
    }

    fn lookup(&self, from: &S, to: &S, stage: Stage) -> Option<&Vec<Handler<S, A>>> {
        let key = TransitionKey {
            from: from.clone(),
            to: to.clone(),
            stage,
        };
        self.handlers.get(&key)
    }
}

/// The three optional single-slot hooks of a machine.
pub(crate) struct Hooks<S: State, A: Send + Sync + 'static> {
    before_all: Option<Handler<S, A>>,
    finalize: Option<Handler<S, A>>,
    after_all: Option<Handler<S, A>>,
}

impl<S: State, A: Send + Sync + 'static> Hooks<S, A> {
    pub(crate) fn new() -> Self {
        Self {
            before_all: None,
            finalize: None,
            after_all: None,
        }
    }

    pub(crate) fn get(&self, hook: Hook) -> Option<&Handler<S, A>> {
        self.slot(hook).as_ref()
    }

    /// Replace a slot, returning whatever was installed before.
    pub(crate) fn set(&mut self, hook: Hook, handler: Option<Handler<S, A>>) -> Option<Handler<S, A>> {
        std::mem::replace(self.slot_mut(hook), handler)
    }

    fn slot(&self, hook: Hook) -> &Option<Handler<S, A>> {
        match hook {
            Hook::BeforeAll => &self.before_all,
            Hook::Finalize => &self.finalize,
            Hook::AfterAll => &self.after_all,
        }
    }

    fn slot_mut(&mut self, hook: Hook) -> &mut Option<Handler<S, A>> {
        match hook {
            Hook::BeforeAll => &mut self.before_all,
            Hook::Finalize => &mut self.finalize,
            Hook::AfterAll => &mut self.after_all,
        }
    }
}

impl<S: State, A: Send + Sync + 'static> Clone for Hooks<S, A> {
    fn clone(&self) -> Self {
        Self {
            before_all: self.before_all.clone(),
            finalize: self.finalize.clone(),
            after_all: self.after_all.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::handler::noop;
    use std::sync::Arc;

    fn handler() -> Handler<&'static str, ()> {
        Arc::new(noop::<&'static str, ()>)
    }

    #[test]
    fn before_and_after_entries_do_not_make_a_transition_legal() {
        let mut registry = Registry::new();
        registry.register("start", "end", Stage::Before, handler());
        registry.register("start", "end", Stage::After, handler());

        assert!(!registry.is_legal(&"start", &"end"));
        assert!(registry.plan(&"start", &"end").is_none());
    }

    #[test]
    fn plan_collects_every_stage_in_registration_order() {
        let mut registry = Registry::new();
        let first = handler();
        let second = handler();
        registry.register("start", "end", Stage::InProgress, Arc::clone(&first));
        registry.register("start", "end", Stage::InProgress, Arc::clone(&second));
        registry.register("start", "end", Stage::After, handler());

        let plan = registry.plan(&"start", &"end").unwrap();
        assert!(plan.before.is_empty());
        assert_eq!(plan.in_progress.len(), 2);
        assert!(Arc::ptr_eq(&plan.in_progress[0], &first));
        assert!(Arc::ptr_eq(&plan.in_progress[1], &second));
        assert_eq!(plan.after.len(), 1);
    }

    #[test]
    fn legality_is_directional() {
        let mut registry = Registry::new();
        registry.register("start", "end", Stage::InProgress, handler());

        assert!(registry.is_legal(&"start", &"end"));
        assert!(!registry.is_legal(&"end", &"start"));
    }

    #[test]
    fn hook_slots_are_overwritable() {
        let mut hooks: Hooks<&'static str, ()> = Hooks::new();
        assert!(hooks.get(Hook::Finalize).is_none());

        assert!(hooks.set(Hook::Finalize, Some(handler())).is_none());
        assert!(hooks.set(Hook::Finalize, Some(handler())).is_some());
        assert!(hooks.get(Hook::Finalize).is_some());
        assert!(hooks.get(Hook::BeforeAll).is_none());

        hooks.set(Hook::Finalize, None);
        assert!(hooks.get(Hook::Finalize).is_none());
    }
}
