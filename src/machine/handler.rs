//! Handler signatures and the stock handlers shipped with the crate.

use crate::core::State;
use crate::machine::event::TransitionEvent;
use std::sync::Arc;

/// Error type returned by failing handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of a single handler invocation.
pub type HandlerResult = Result<(), BoxError>;

/// Stored form of a handler. Shared so a transition can snapshot the
/// handler lists without holding the registry lock while they run.
pub(crate) type Handler<S, A> = Arc<dyn Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync>;

/// Handler that does nothing and always succeeds.
///
/// Registering it at the in-progress stage makes a transition legal when
/// all of the real work lives in before/after handlers.
pub fn noop<S, A>(_event: &TransitionEvent<S, A>) -> HandlerResult
where
    S: State,
    A: Send + Sync + 'static,
{
    Ok(())
}

/// Create a handler that moves the machine on to `state`.
///
/// The nested transition receives the same arguments as the one that
/// triggered it. Typically registered as an after handler so that one
/// `transit` call walks several hops:
///
/// ```rust
/// use switchyard::machine::{transition_to, Machine};
/// use switchyard::retry::RetryPolicy;
///
/// let machine: Machine<&str> = Machine::new("start", RetryPolicy::default());
/// machine.allow(["start"], "middle");
/// machine.allow(["middle"], "end");
/// machine.on_after(["start"], "middle", transition_to("end"));
///
/// machine.transit("middle", Vec::new()).unwrap();
/// assert_eq!(machine.current_state(), "end");
/// ```
///
/// Each hop runs on the same call stack; chains that never terminate will
/// overflow it.
pub fn transition_to<S, A>(
    state: S,
) -> impl Fn(&TransitionEvent<S, A>) -> HandlerResult + Send + Sync + 'static
where
    S: State,
    A: Send + Sync + 'static,
{
    move |event: &TransitionEvent<S, A>| {
        event
            .machine
            .transit(state.clone(), Arc::clone(&event.args))
            .map_err(BoxError::from)
    }
}
