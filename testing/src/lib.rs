//! # Hotel Ops Testing
//!
//! Testing utilities and helpers for the hotel operations ledger.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - An in-memory key/value store with switchable write failures
//! - Given-When-Then reducer tests
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use hotel_ops_testing::{test_clock, InMemoryKeyValueStore};
//! use hotel_ops_runtime::Store;
//!
//! #[test]
//! fn reserve_flow() {
//!     let env = LedgerEnvironment::new(Arc::new(test_clock()));
//!     let mut store = Store::new(LedgerState::default(), LedgerReducer::new(), env);
//!
//!     store.send(LedgerAction::ReservePart { .. }).unwrap();
//!
//!     assert_eq!(store.state(|s| s.parts[0].reserved), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use hotel_ops_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use hotel_ops_core::storage::{KeyValueStore, StorageError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use hotel_ops_testing::mocks::FixedClock;
    /// use hotel_ops_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// A clock fixed `duration` later than this one
        #[must_use]
        pub fn advanced_by(&self, duration: chrono::Duration) -> Self {
            Self::new(self.time + duration)
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory key/value store for fast, deterministic testing.
    ///
    /// Writes can be switched to fail with [`InMemoryKeyValueStore::fail_writes`]
    /// to exercise persistence error paths.
    ///
    /// # Example
    ///
    /// ```
    /// use hotel_ops_testing::InMemoryKeyValueStore;
    /// use hotel_ops_core::storage::KeyValueStore;
    ///
    /// let store = InMemoryKeyValueStore::new();
    /// store.save("demo_parts", "[]").unwrap();
    /// assert_eq!(store.get("demo_parts").unwrap().as_deref(), Some("[]"));
    ///
    /// store.fail_writes(true);
    /// assert!(store.save("demo_parts", "[]").is_err());
    /// ```
    #[derive(Clone, Debug, Default)]
    pub struct InMemoryKeyValueStore {
        data: Arc<RwLock<HashMap<String, String>>>,
        failing: Arc<AtomicBool>,
        writes: Arc<AtomicUsize>,
    }

    impl InMemoryKeyValueStore {
        /// Create a new empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent write fail (or succeed again)
        pub fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of successful writes so far
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        /// Get the number of stored keys
        #[must_use]
        pub fn len(&self) -> usize {
            self.data.read().map_or(0, |data| data.len())
        }

        /// Check if the store is empty
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Get all keys in the store, sorted
        #[must_use]
        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self
                .data
                .read()
                .map(|data| data.keys().cloned().collect())
                .unwrap_or_default();
            keys.sort();
            keys
        }

        /// Clear all data (for test isolation)
        pub fn clear(&self) {
            if let Ok(mut data) = self.data.write() {
                data.clear();
            }
        }

        fn poisoned(key: &str) -> StorageError {
            StorageError::Io {
                key: key.to_string(),
                message: "lock poisoned".to_string(),
            }
        }
    }

    impl KeyValueStore for InMemoryKeyValueStore {
        fn save(&self, key: &str, document: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    message: "simulated write failure".to_string(),
                });
            }
            self.data
                .write()
                .map_err(|_| Self::poisoned(key))?
                .insert(key.to_string(), document.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self
                .data
                .read()
                .map_err(|_| Self::poisoned(key))?
                .get(key)
                .cloned())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.data
                .write()
                .map_err(|_| Self::poisoned(key))?
                .remove(key);
            Ok(())
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Quantities a user would type into a reserve or order form
    pub fn quantity() -> impl Strategy<Value = i64> {
        1_i64..=25
    }

    /// Non-zero manual stock adjustments, including large removals
    pub fn stock_delta() -> impl Strategy<Value = i64> {
        prop_oneof![-60_i64..=-1, 1_i64..=60]
    }
}

/// Install a test-friendly tracing subscriber
///
/// Safe to call from many tests; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, InMemoryKeyValueStore};
