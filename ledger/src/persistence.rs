//! Collection persistence.
//!
//! Each collection is one JSON document under `<namespace>_<collection>`.
//! Writes happen as storage effects after a command is applied; reads happen
//! once, when a ledger is opened. A missing or malformed document never fails
//! the load: tickets, parts and purchase orders fall back to the bundled seed,
//! everything else to an empty collection.

use crate::classify;
use crate::seed;
use crate::state::{LedgerState, Sequences};
use crate::types::{InventoryPart, Role, Ticket, TicketOrigin};
use chrono::{DateTime, Utc};
use hotel_ops_core::storage::{KeyValueStore, StorageError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A persisted collection
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Tickets
    Tickets,
    /// Parts catalogue
    Parts,
    /// Purchase orders
    PurchaseOrders,
    /// Stock movements
    Movements,
    /// Utility logbook
    Logbook,
    /// Inspection timestamps
    Inspections,
}

impl Collection {
    /// Every collection
    pub const ALL: [Self; 6] = [
        Self::Tickets,
        Self::Parts,
        Self::PurchaseOrders,
        Self::Movements,
        Self::Logbook,
        Self::Inspections,
    ];

    /// Key suffix
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Tickets => "tickets",
            Self::Parts => "parts",
            Self::PurchaseOrders => "purchase_orders",
            Self::Movements => "movements",
            Self::Logbook => "logbook",
            Self::Inspections => "inspections",
        }
    }

    /// Storage key under `namespace`
    #[must_use]
    pub fn key(self, namespace: &str) -> String {
        format!("{namespace}_{}", self.suffix())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Errors raised while writing collections
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The backend rejected a read or write
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A collection could not be encoded
    #[error("Failed to encode '{key}': {source}")]
    Encode {
        /// Key being written
        key: String,
        /// Encoder error
        #[source]
        source: serde_json::Error,
    },
}

/// Encode one collection as `(key, document)`
///
/// # Errors
///
/// Returns [`PersistenceError::Encode`] if serialization fails
pub fn encode(
    state: &LedgerState,
    collection: Collection,
    namespace: &str,
) -> Result<(String, String), PersistenceError> {
    let key = collection.key(namespace);
    let document = match collection {
        Collection::Tickets => serde_json::to_string(&state.tickets),
        Collection::Parts => serde_json::to_string(&state.parts),
        Collection::PurchaseOrders => serde_json::to_string(&state.purchase_orders),
        Collection::Movements => serde_json::to_string(&state.movements),
        Collection::Logbook => serde_json::to_string(&state.logbook),
        Collection::Inspections => serde_json::to_string(&state.inspections),
    };
    document
        .map(|document| (key.clone(), document))
        .map_err(|source| PersistenceError::Encode { key, source })
}

/// Encode several collections
///
/// # Errors
///
/// Returns the first encoding failure
pub fn snapshot_documents(
    state: &LedgerState,
    collections: impl IntoIterator<Item = Collection>,
    namespace: &str,
) -> Result<Vec<(String, String)>, PersistenceError> {
    collections
        .into_iter()
        .map(|collection| encode(state, collection, namespace))
        .collect()
}

/// Write every collection to `store`
///
/// # Errors
///
/// Returns the first encoding or storage failure
pub fn save_all(
    store: &dyn KeyValueStore,
    state: &LedgerState,
    namespace: &str,
) -> Result<(), PersistenceError> {
    for (key, document) in snapshot_documents(state, Collection::ALL, namespace)? {
        store.save(&key, &document)?;
    }
    Ok(())
}

/// Load a ledger from `store`
///
/// Tickets are migrated on the way in: a missing maintenance type is derived
/// from the asset, a missing origin from the creator role, a missing part id
/// from a case-insensitive part name match, and every score is recomputed.
#[must_use]
pub fn hydrate(store: &dyn KeyValueStore, namespace: &str, now: DateTime<Utc>) -> LedgerState {
    let parts: Vec<InventoryPart> =
        load(store, &Collection::Parts.key(namespace)).unwrap_or_else(seed::parts);

    let mut tickets = load_tickets(store, &Collection::Tickets.key(namespace))
        .unwrap_or_else(|| seed::tickets(now));
    for ticket in &mut tickets {
        link_part_by_name(ticket, &parts);
        ticket.rescore();
    }

    let mut state = LedgerState {
        tickets,
        parts,
        purchase_orders: load(store, &Collection::PurchaseOrders.key(namespace))
            .unwrap_or_else(seed::purchase_orders),
        movements: load(store, &Collection::Movements.key(namespace)).unwrap_or_default(),
        logbook: load(store, &Collection::Logbook.key(namespace)).unwrap_or_default(),
        inspections: load(store, &Collection::Inspections.key(namespace)).unwrap_or_default(),
        ..LedgerState::default()
    };
    state.sequences = Sequences::rebuild(&state);

    tracing::info!(
        namespace,
        tickets = state.tickets.len(),
        parts = state.parts.len(),
        purchase_orders = state.purchase_orders.len(),
        movements = state.movements.len(),
        "ledger hydrated"
    );
    state
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(Some(document)) => Some(document),
        Ok(None) => {
            tracing::debug!(key, "no stored document, using fallback");
            None
        },
        Err(error) => {
            tracing::warn!(key, %error, "storage read failed, using fallback");
            None
        },
    }
}

fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let document = read(store, key)?;
    serde_json::from_str(&document)
        .inspect_err(|error| tracing::warn!(key, %error, "malformed document, using fallback"))
        .ok()
}

fn load_tickets(store: &dyn KeyValueStore, key: &str) -> Option<Vec<Ticket>> {
    let document = read(store, key)?;
    let mut raw: Vec<Value> = serde_json::from_str(&document)
        .inspect_err(|error| tracing::warn!(key, %error, "malformed document, using fallback"))
        .ok()?;
    raw.iter_mut().for_each(fill_missing_ticket_fields);
    serde_json::from_value(Value::Array(raw))
        .inspect_err(|error| tracing::warn!(key, %error, "malformed ticket, using fallback"))
        .ok()
}

fn fill_missing_ticket_fields(ticket: &mut Value) {
    let Some(fields) = ticket.as_object_mut() else {
        return;
    };

    if !fields.contains_key("maintenance_type") {
        let asset = fields.get("asset").and_then(Value::as_str).unwrap_or_default();
        if let Ok(value) = serde_json::to_value(classify::maintenance_type_for(asset)) {
            fields.insert("maintenance_type".to_string(), value);
        }
    }

    if !fields.contains_key("origin") {
        let creator = fields
            .get("created_by")
            .cloned()
            .and_then(|value| serde_json::from_value::<Role>(value).ok())
            .unwrap_or_default();
        if let Ok(value) = serde_json::to_value(TicketOrigin::for_creator(creator)) {
            fields.insert("origin".to_string(), value);
        }
    }
}

fn link_part_by_name(ticket: &mut Ticket, parts: &[InventoryPart]) {
    if !ticket.needs_part || ticket.part_id.is_some() {
        return;
    }
    let Some(name) = ticket.part_name.as_deref() else {
        return;
    };
    let wanted = name.trim().to_lowercase();
    if let Some(part) = parts.iter().find(|p| p.name.trim().to_lowercase() == wanted) {
        tracing::debug!(ticket = %ticket.id, part = %part.id, "linked part by name");
        ticket.part_id = Some(part.id.clone());
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    /// Open `root`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|error| StorageError::Io {
            key: root.display().to_string(),
            message: error.to_string(),
        })?;
        Ok(Self { root })
    }

    /// Directory holding the documents
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if valid {
            Ok(self.root.join(format!("{key}.json")))
        } else {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }
}

fn io_error(key: &str, error: &std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        message: error.to_string(),
    }
}

impl KeyValueStore for JsonDirectoryStore {
    fn save(&self, key: &str, document: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::write(&path, document).map_err(|error| io_error(key, &error))
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(document) => Ok(Some(document)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(key, &error)),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(key, &error)),
        }
    }
}
