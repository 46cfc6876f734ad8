//! The transition engine and everything a handler touches.
//!
//! # Key Concepts
//!
//! - **Machine**: owns the current state, the registry and the hooks
//! - **Handlers**: plain functions of a [`TransitionEvent`], registered per
//!   (source, destination, stage)
//! - **Hooks**: optional machine-wide handlers around every transition
//!
//! Only a failure before the commit can stop a transition. Once the new state
//! is committed, handler failures are logged and dropped: there is no rollback.

mod engine;
mod error;
mod event;
mod handler;
mod registry;

pub use engine::Machine;
pub use error::TransitionError;
pub use event::TransitionEvent;
pub use handler::{noop, transition_to, BoxError, HandlerResult};
pub(crate) use handler::Handler;
