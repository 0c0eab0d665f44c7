//! Key/value document storage.
//!
//! The ledger mirrors each of its collections into a namespaced key holding a
//! JSON document. This module defines the backend abstraction only; encoding
//! lives with the domain types.
//!
//! # Implementations
//!
//! - `JsonDirectoryStore` (in `hotel-ops-ledger`): one file per key on disk
//! - `InMemoryKeyValueStore` (in `hotel-ops-testing`): `HashMap`-backed, for tests
//!
//! # Example
//!
//! ```
//! use hotel_ops_core::storage::{KeyValueStore, StorageError};
//!
//! fn save_twice(store: &dyn KeyValueStore) -> Result<(), StorageError> {
//!     store.save("demo_tickets", "[]")?;
//!     store.save("demo_tickets", "[]")?;
//!     assert_eq!(store.get("demo_tickets")?.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not read or write the underlying medium.
    #[error("I/O error on '{key}': {message}")]
    Io {
        /// Key being accessed
        key: String,
        /// Backend-specific message
        message: String,
    },

    /// The key cannot be represented by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous key/value store holding UTF-8 documents.
///
/// Implementations must be `Send + Sync` so the handle can be shared through
/// an `Arc` inside effect descriptions.
pub trait KeyValueStore: Send + Sync {
    /// Store `document` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the write.
    fn save(&self, key: &str, document: &str) -> Result<(), StorageError>;

    /// Fetch the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether `key` holds a document.
    ///
    /// Default implementation uses [`KeyValueStore::get`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}
