//! Dispatch stages of a transition and the hooks that wrap them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// When a handler runs relative to the state commit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Stage {
    /// Before any in-progress work. Failures abort the transition.
    Before,

    /// The transition's own work. Registering here is what makes a
    /// transition legal. Failures abort the transition.
    InProgress,

    /// After the new state has been committed. Failures are logged and ignored.
    After,
}

impl Stage {
    /// Whether a failure at this stage aborts the transition.
    pub fn aborts_on_failure(self) -> bool {
        !matches!(self, Self::After)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Before => "before",
            Self::InProgress => "in-progress",
            Self::After => "after",
        };
        f.write_str(name)
    }
}

/// Machine-wide hooks that run around every transition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Hook {
    /// Runs first, before any per-transition handler.
    BeforeAll,

    /// Runs after the in-progress handlers, right before the commit.
    Finalize,

    /// Runs last, after every per-transition after handler.
    AfterAll,
}

impl Hook {
    /// The stage reported in events delivered to this hook.
    pub fn stage(self) -> Stage {
        match self {
            Self::BeforeAll => Stage::Before,
            Self::Finalize => Stage::InProgress,
            Self::AfterAll => Stage::After,
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeAll => "before-all",
            Self::Finalize => "finalize",
            Self::AfterAll => "after-all",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_report_matching_stage() {
        assert_eq!(Hook::BeforeAll.stage(), Stage::Before);
        assert_eq!(Hook::Finalize.stage(), Stage::InProgress);
        assert_eq!(Hook::AfterAll.stage(), Stage::After);
    }

    #[test]
    fn only_after_stage_tolerates_failures() {
        assert!(Stage::Before.aborts_on_failure());
        assert!(Stage::InProgress.aborts_on_failure());
        assert!(!Stage::After.aborts_on_failure());
    }

    #[test]
    fn stage_displays_lowercase() {
        assert_eq!(Stage::Before.to_string(), "before");
        assert_eq!(Stage::InProgress.to_string(), "in-progress");
        assert_eq!(Stage::After.to_string(), "after");
    }
}
