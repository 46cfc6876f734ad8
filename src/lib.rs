//! Switchyard: a finite state machine with staged transition handlers
//!
//! A [`Machine`] holds one current state and a registry of handlers keyed by
//! (source state, destination state, stage). A transition runs its handlers
//! in a fixed order and commits the new state between the in-progress and
//! the after stage.
//!
//! # Core Concepts
//!
//! - **State**: any hashable value implementing the `State` trait
//! - **Stages**: `Before`, `InProgress` and `After`; a transition is legal only
//!   if an in-progress handler is registered for it
//! - **Hooks**: optional machine-wide `before_all`, `finalize` and `after_all`
//!   handlers that bracket every transition
//! - **Retries**: `transit_with_retries` repeats a failing transition with
//!   backoff until it succeeds, the budget is spent, or `stop` is called
//!
//! # Example
//!
//! ```rust
//! use switchyard::{transition_to, MachineBuilder};
//!
//! let machine = MachineBuilder::<&str, ()>::new()
//!     .initial("green")
//!     .allow(["green"], "yellow")
//!     .allow(["yellow"], "red")
//!     .after(["yellow"], "red", transition_to("halted"))
//!     .allow(["red"], "halted")
//!     .build()
//!     .unwrap();
//!
//! machine.transit("yellow", Vec::new()).unwrap();
//! machine.transit("red", Vec::new()).unwrap();
//!
//! assert_eq!(machine.current_state(), "halted");
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod retry;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use core::{Hook, Stage, State};
pub use machine::{
    noop, transition_to, BoxError, HandlerResult, Machine, TransitionError, TransitionEvent,
};
pub use retry::{BackoffConfig, RetryConfig, RetryPolicy, StopSignal};
