//! # Hotel Ops Core
//!
//! Core traits and types for the hotel operations ledger.
//!
//! Every write into the ledger goes through a reducer: a deterministic
//! function that validates an action against the current state, mutates the
//! state in place and returns descriptions of side effects for the runtime to
//! execute afterwards.
//!
//! ## Core Concepts
//!
//! - **State**: The in-memory collections a feature owns
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (clock, storage)
//!
//! ## Example
//!
//! ```ignore
//! use hotel_ops_core::*;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative helpers for building storage effects
pub mod effect_macros;

/// Key/value document storage abstraction
pub mod storage;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime after the
/// reducer has returned. They are values, not execution.
pub mod effect {
    use crate::storage::{KeyValueStore, StorageError};
    use std::sync::Arc;
    use std::time::Duration;

    /// Callback invoked after a storage write succeeds
    pub type OnSaved<Action> = Box<dyn FnOnce() -> Option<Action> + Send>;

    /// Callback invoked after a storage write fails
    pub type OnStorageError<Action> = Box<dyn FnOnce(StorageError) -> Option<Action> + Send>;

    /// Storage operation described by a reducer
    pub enum StorageOperation<Action> {
        /// Write a batch of documents, each under its own key
        Save {
            /// Backend to write to
            store: Arc<dyn KeyValueStore>,
            /// `(key, document)` pairs, written in order
            documents: Vec<(String, String)>,
            /// Feedback when every document was written
            on_success: OnSaved<Action>,
            /// Feedback for the first failing write
            on_error: OnStorageError<Action>,
        },
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects side by side (executed in declaration order)
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after the other
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Document storage write
        Storage(StorageOperation<Action>),
    }

    impl<Action> std::fmt::Debug for StorageOperation<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                StorageOperation::Save { documents, .. } => f
                    .debug_struct("StorageOperation::Save")
                    .field(
                        "keys",
                        &documents.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>(),
                    )
                    .finish_non_exhaustive(),
            }
        }
    }

    // Manual Debug implementation since callbacks don't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Storage(operation) => {
                    f.debug_tuple("Effect::Storage").field(operation).finish()
                },
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run side by side
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Returns true if this effect (or any nested effect) writes to storage
        #[must_use]
        pub fn touches_storage(&self) -> bool {
            match self {
                Effect::Storage(_) => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().any(Effect::touches_storage)
                },
                Effect::None | Effect::Delay { .. } => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn nested_effects_report_no_storage() {
        let effect: Effect<()> = Effect::chain(vec![
            Effect::None,
            Effect::merge(vec![Effect::None]),
        ]);
        assert!(!effect.touches_storage());
    }
}
