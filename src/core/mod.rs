//! Core state machine vocabulary.
//!
//! This module contains the types every other part of the crate speaks in:
//! - State definitions via the `State` trait
//! - The `Stage` a handler runs at and the machine-wide `Hook`s
//!
//! Nothing here performs a transition; see [`crate::machine`] for that.

mod stage;
mod state;

pub use stage::{Hook, Stage};
pub use state::State;
