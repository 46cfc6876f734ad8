//! Builder API for ergonomic state machine construction.
//!
//! [`MachineBuilder`] collects the initial state, retry policy, handlers and
//! hooks up front and checks them once in `build()`. The [`state_enum!`]
//! macro removes the boilerplate of implementing [`State`](crate::core::State)
//! for plain enums.
//!
//! [`state_enum!`]: crate::state_enum

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;
