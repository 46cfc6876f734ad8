//! Core State trait for state machine states.
//!
//! The engine attaches no meaning to a state beyond equality and hashing.
//! Names are used for diagnostics and error messages only.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: states are copied into every transition event
/// - `Eq` + `Hash`: states form part of the registry key
/// - `Debug`: states must be debuggable for diagnostics
/// - `Send` + `Sync`: machines are shared across tasks
///
/// Plain strings work out of the box:
///
/// ```rust
/// use switchyard::core::State;
///
/// assert_eq!("start".name(), "start");
/// assert_eq!(String::from("end").name(), "end");
/// ```
///
/// Enums usually get the implementation from [`state_enum!`](crate::state_enum):
///
/// ```rust
/// use switchyard::core::State;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum TaskState {
///     Pending,
///     Running,
///     Complete,
/// }
///
/// impl State for TaskState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Pending => "Pending",
///             Self::Running => "Running",
///             Self::Complete => "Complete",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Complete)
///     }
/// }
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Purely informational: the registry alone decides which transitions
    /// are legal. Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

impl State for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Initial => "Initial",
                Self::Processing => "Processing",
                Self::Complete => "Complete",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Complete)
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Initial.name(), "Initial");
        assert_eq!(TestState::Processing.name(), "Processing");
        assert_eq!(TestState::Complete.name(), "Complete");
    }

    #[test]
    fn is_final_identifies_terminal_states() {
        assert!(!TestState::Initial.is_final());
        assert!(!TestState::Processing.is_final());
        assert!(TestState::Complete.is_final());
    }

    #[test]
    fn string_states_use_their_contents_as_name() {
        let owned = String::from("draining");
        assert_eq!(owned.name(), "draining");
        assert_eq!("idle".name(), "idle");
        assert!(!"idle".is_final());
    }
}
