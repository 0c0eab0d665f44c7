//! Ledger operation errors.
//!
//! Every failure is an expected, recoverable outcome returned to the caller.
//! A rejected command never changes state.

use crate::types::{Capability, PartId, PurchaseOrderId, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of entity a lookup failed on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ticket
    Ticket,
    /// Inventory part
    Part,
    /// Purchase order
    PurchaseOrder,
    /// Active reservation on a ticket
    Reservation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ticket => "Ticket",
            Self::Part => "Part",
            Self::PurchaseOrder => "Purchase order",
            Self::Reservation => "Reservation",
        };
        f.write_str(label)
    }
}

/// Errors returned by ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// The active role lacks the capability
    #[error("Permission denied: {role} cannot {capability}")]
    PermissionDenied {
        /// Active role
        role: Role,
        /// Missing capability
        capability: Capability,
    },

    /// A referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind
        entity: EntityKind,
        /// Identifier looked up
        id: String,
    },

    /// The reservation exceeds `on_hand − reserved`
    #[error("Insufficient stock for {part_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Part
        part_id: PartId,
        /// Units requested
        requested: u32,
        /// Units available
        available: u32,
    },

    /// A quantity, delta or reading is unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The purchase order was already received
    #[error("Purchase order {0} was already received")]
    AlreadyFinalized(PurchaseOrderId),

    /// The runtime could not finish processing the command
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// `NotFound` for `entity` with the given id
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
