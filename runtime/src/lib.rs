//! # Hotel Ops Runtime
//!
//! Synchronous Store runtime for the hotel operations ledger.
//!
//! The ledger is single-threaded: every action runs to completion before the
//! next one is accepted. The Store owns the state, runs the reducer, then
//! executes the returned effects in order, feeding any resulting actions back
//! into the reducer until the queue drains.
//!
//! ## Example
//!
//! ```ignore
//! use hotel_ops_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use hotel_ops_core::effect::{Effect, StorageOperation};
use hotel_ops_core::reducer::Reducer;
use std::collections::VecDeque;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept producing feedback actions past the configured limit
        ///
        /// The state reflects every action processed before the limit hit.
        #[error("Feedback loop exceeded {0} actions")]
        FeedbackLimitExceeded(usize),
    }
}

pub use error::StoreError;

/// Configuration for the Store runtime
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of actions processed by a single `send`, including feedback
    pub max_actions_per_send: usize,
}

impl StoreConfig {
    /// Create a new configuration
    #[must_use]
    pub const fn new(max_actions_per_send: usize) -> Self {
        Self {
            max_actions_per_send,
        }
    }

    /// Set the feedback limit
    #[must_use]
    pub const fn with_max_actions_per_send(mut self, limit: usize) -> Self {
        self.max_actions_per_send = limit;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_actions_per_send: 64,
        }
    }
}

/// Summary of one `send` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Actions reduced, the initial one included
    pub actions_processed: usize,
    /// Storage operations executed
    pub storage_operations: usize,
    /// Storage operations that reported an error
    pub storage_failures: usize,
}

/// The Store - runtime for reducer execution and effect handling
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer type
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    config: StoreConfig,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new Store with custom configuration
    #[must_use]
    pub const fn with_config(
        initial_state: S,
        reducer: R,
        environment: E,
        config: StoreConfig,
    ) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
            config,
        }
    }

    /// Send an action to the store
    ///
    /// Runs the reducer, executes the returned effects, and keeps reducing
    /// feedback actions until none remain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FeedbackLimitExceeded`] when more than
    /// `max_actions_per_send` actions would be processed.
    pub fn send(&mut self, action: A) -> Result<SendReport, StoreError> {
        let mut queue = VecDeque::from([action]);
        let mut report = SendReport::default();

        while let Some(next) = queue.pop_front() {
            if report.actions_processed >= self.config.max_actions_per_send {
                tracing::warn!(
                    limit = self.config.max_actions_per_send,
                    dropped = queue.len() + 1,
                    "feedback limit reached, dropping remaining actions"
                );
                return Err(StoreError::FeedbackLimitExceeded(
                    self.config.max_actions_per_send,
                ));
            }

            let effects = self.reducer.reduce(&mut self.state, next, &self.environment);
            report.actions_processed += 1;

            for effect in effects {
                Self::execute_effect(effect, &mut queue, &mut report);
            }
        }

        Ok(report)
    }

    /// Read from the current state
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state)
    }

    /// Borrow the current state
    #[must_use]
    pub const fn snapshot(&self) -> &S {
        &self.state
    }

    /// Borrow the injected environment
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// Consume the store, returning its state
    pub fn into_state(self) -> S {
        self.state
    }

    /// Execute one effect, queueing any feedback action it produces
    fn execute_effect(effect: Effect<A>, queue: &mut VecDeque<A>, report: &mut SendReport) {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                for nested in effects {
                    Self::execute_effect(nested, queue, report);
                }
            },
            Effect::Delay { duration, action } => {
                tracing::trace!(?duration, "delaying feedback action");
                std::thread::sleep(duration);
                queue.push_back(*action);
            },
            Effect::Storage(StorageOperation::Save {
                store,
                documents,
                on_success,
                on_error,
            }) => {
                report.storage_operations += 1;
                let failure = documents.iter().find_map(|(key, document)| {
                    store
                        .save(key, document)
                        .err()
                        .inspect(|error| tracing::warn!(%key, %error, "storage write failed"))
                });

                let feedback = match failure {
                    None => {
                        tracing::trace!(documents = documents.len(), "storage write complete");
                        on_success()
                    },
                    Some(error) => {
                        report.storage_failures += 1;
                        on_error(error)
                    },
                };

                if let Some(action) = feedback {
                    queue.push_back(action);
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hotel_ops_core::effect::Effect;
    use hotel_ops_core::storage::KeyValueStore;
    use hotel_ops_core::{delay, save_documents, smallvec, SmallVec};
    use hotel_ops_testing::InMemoryKeyValueStore;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Debug, Default)]
    struct ShelfState {
        count: u32,
        saved: u32,
        failures: Vec<String>,
    }

    #[derive(Clone, Debug)]
    enum ShelfAction {
        Add,
        AddLater,
        Persist,
        Saved,
        SaveFailed(String),
        Echo,
    }

    struct ShelfEnv {
        storage: Arc<dyn KeyValueStore>,
    }

    struct ShelfReducer;

    impl Reducer for ShelfReducer {
        type State = ShelfState;
        type Action = ShelfAction;
        type Environment = ShelfEnv;

        fn reduce(
            &self,
            state: &mut ShelfState,
            action: ShelfAction,
            env: &ShelfEnv,
        ) -> SmallVec<[Effect<ShelfAction>; 4]> {
            match action {
                ShelfAction::Add => {
                    state.count += 1;
                    SmallVec::new()
                },
                ShelfAction::AddLater => smallvec![delay! {
                    duration: Duration::from_millis(1),
                    action: ShelfAction::Add
                }],
                ShelfAction::Persist => {
                    let documents = vec![("shelf_count".to_string(), state.count.to_string())];
                    smallvec![save_documents! {
                        store: env.storage,
                        documents: documents,
                        on_success: || Some(ShelfAction::Saved),
                        on_error: |error| Some(ShelfAction::SaveFailed(error.to_string()))
                    }]
                },
                ShelfAction::Saved => {
                    state.saved += 1;
                    SmallVec::new()
                },
                ShelfAction::SaveFailed(error) => {
                    state.failures.push(error);
                    SmallVec::new()
                },
                ShelfAction::Echo => smallvec![Effect::chain(vec![
                    Effect::None,
                    delay! { duration: Duration::ZERO, action: ShelfAction::Echo },
                ])],
            }
        }
    }

    fn store_with(storage: Arc<dyn KeyValueStore>) -> Store<ShelfState, ShelfAction, ShelfEnv, ShelfReducer> {
        Store::new(ShelfState::default(), ShelfReducer, ShelfEnv { storage })
    }

    #[test]
    fn send_applies_action() {
        let mut store = store_with(Arc::new(InMemoryKeyValueStore::new()));
        let report = store.send(ShelfAction::Add).unwrap();
        assert_eq!(report.actions_processed, 1);
        assert_eq!(store.state(|s| s.count), 1);
    }

    #[test]
    fn delayed_action_is_processed_within_send() {
        let mut store = store_with(Arc::new(InMemoryKeyValueStore::new()));
        let report = store.send(ShelfAction::AddLater).unwrap();
        assert_eq!(report.actions_processed, 2);
        assert_eq!(store.state(|s| s.count), 1);
    }

    #[test]
    fn storage_success_feeds_back() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = store_with(storage.clone());
        store.send(ShelfAction::Add).unwrap();
        let report = store.send(ShelfAction::Persist).unwrap();

        assert_eq!(report.storage_operations, 1);
        assert_eq!(report.storage_failures, 0);
        assert_eq!(store.state(|s| s.saved), 1);
        assert_eq!(storage.get("shelf_count").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn storage_failure_feeds_back() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        storage.fail_writes(true);
        let mut store = store_with(storage);
        let report = store.send(ShelfAction::Persist).unwrap();

        assert_eq!(report.storage_failures, 1);
        assert_eq!(store.state(|s| s.failures.len()), 1);
        assert_eq!(store.state(|s| s.saved), 0);
    }

    #[test]
    fn runaway_feedback_is_bounded() {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let mut store = Store::with_config(
            ShelfState::default(),
            ShelfReducer,
            ShelfEnv { storage },
            StoreConfig::default().with_max_actions_per_send(5),
        );

        let result = store.send(ShelfAction::Echo);
        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded(5)));
    }
}
