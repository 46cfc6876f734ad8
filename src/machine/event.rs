//! Event passed to every handler.

use crate::core::{Stage, State};
use crate::machine::engine::Machine;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Snapshot of one stage of a transition, as seen by a handler.
///
/// A fresh event is built for every stage (and every hook); handlers
/// within a stage share it. The `machine` handle refers to the machine
/// running the transition, so a handler can query it or start another
/// transition.
pub struct TransitionEvent<S: State, A: Send + Sync + 'static> {
    pub machine: Machine<S, A>,
    pub stage: Stage,
    pub from: S,
    pub to: S,
    pub args: Arc<[A]>,
    pub entered_at: DateTime<Utc>,
}

impl<S: State, A: Send + Sync + 'static> TransitionEvent<S, A> {
    /// Positional argument, if the caller supplied that many.
    pub fn arg(&self, index: usize) -> Option<&A> {
        self.args.get(index)
    }
}
