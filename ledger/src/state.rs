//! Ledger state and id sequences.

use crate::error::LedgerError;
use crate::logbook::LogbookEntry;
use crate::types::{
    InventoryPart, LogbookEntryId, MovementId, PartId, PartMovement, PurchaseOrder, PurchaseOrderId,
    Receipt, Role, Ticket, TicketId,
};
use chrono::{DateTime, Utc};
use hotel_ops_macros::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ticket ids start above this value on an empty ledger
pub const TICKET_SEQUENCE_FLOOR: u32 = 1000;

/// Authoritative id generator for every id kind
///
/// Each counter holds the highest number issued so far. `observe_*` raises a
/// counter when ids are loaded from elsewhere so a new id never collides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    ticket: u32,
    movement: u32,
    purchase_order: u32,
    logbook: u32,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            ticket: TICKET_SEQUENCE_FLOOR,
            movement: 0,
            purchase_order: 0,
            logbook: 0,
        }
    }
}

impl Sequences {
    /// Sequences continuing after every id present in `state`
    #[must_use]
    pub fn rebuild(state: &LedgerState) -> Self {
        let mut sequences = Self::default();
        state.tickets.iter().for_each(|t| sequences.observe_ticket(t.id));
        state.movements.iter().for_each(|m| sequences.observe_movement(m.id));
        state
            .purchase_orders
            .iter()
            .for_each(|po| sequences.observe_purchase_order(po.id));
        state.logbook.iter().for_each(|e| sequences.observe_logbook(e.id));
        sequences
    }

    /// Issue the next ticket id
    pub const fn next_ticket(&mut self) -> TicketId {
        self.ticket = self.ticket.saturating_add(1);
        TicketId::new(self.ticket)
    }

    /// Issue the next movement id
    pub const fn next_movement(&mut self) -> MovementId {
        self.movement = self.movement.saturating_add(1);
        MovementId::new(self.movement)
    }

    /// Issue the next purchase order id
    pub const fn next_purchase_order(&mut self) -> PurchaseOrderId {
        self.purchase_order = self.purchase_order.saturating_add(1);
        PurchaseOrderId::new(self.purchase_order)
    }

    /// Issue the next logbook entry id
    pub const fn next_logbook(&mut self) -> LogbookEntryId {
        self.logbook = self.logbook.saturating_add(1);
        LogbookEntryId::new(self.logbook)
    }

    /// Record an existing ticket id
    pub fn observe_ticket(&mut self, id: TicketId) {
        self.ticket = self.ticket.max(id.value());
    }

    /// Record an existing movement id
    pub fn observe_movement(&mut self, id: MovementId) {
        self.movement = self.movement.max(id.value());
    }

    /// Record an existing purchase order id
    pub fn observe_purchase_order(&mut self, id: PurchaseOrderId) {
        self.purchase_order = self.purchase_order.max(id.value());
    }

    /// Record an existing logbook entry id
    pub fn observe_logbook(&mut self, id: LogbookEntryId) {
        self.logbook = self.logbook.max(id.value());
    }
}

/// Everything the ledger holds
///
/// Tickets, purchase orders and logbook entries are kept most recent first;
/// movements in chronological order.
#[derive(State, Clone, Debug, Default)]
pub struct LedgerState {
    /// Active operator role
    pub role: Role,
    /// Tickets, newest first
    pub tickets: Vec<Ticket>,
    /// Parts catalogue
    pub parts: Vec<InventoryPart>,
    /// Purchase orders, newest first
    pub purchase_orders: Vec<PurchaseOrder>,
    /// Append-only stock movement log
    pub movements: Vec<PartMovement>,
    /// Utility log entries, newest first
    pub logbook: Vec<LogbookEntry>,
    /// Last inspection time per room
    pub inspections: BTreeMap<String, DateTime<Utc>>,
    /// Id generator
    pub sequences: Sequences,
    /// Number of accepted commands
    #[revision]
    pub revision: u64,
    /// Outcome of the most recent command
    pub last_outcome: Option<Result<Receipt, LedgerError>>,
    /// Most recent persistence failure, cleared by the next successful save
    pub last_persistence_error: Option<String>,
}

impl LedgerState {
    /// State over the given collections with sequences continuing after them
    #[must_use]
    pub fn from_collections(
        tickets: Vec<Ticket>,
        parts: Vec<InventoryPart>,
        purchase_orders: Vec<PurchaseOrder>,
    ) -> Self {
        let mut state = Self {
            tickets,
            parts,
            purchase_orders,
            ..Self::default()
        };
        state.sequences = Sequences::rebuild(&state);
        state
    }

    /// Find a ticket
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub(crate) fn ticket_mut(&mut self, id: TicketId) -> Option<&mut Ticket> {
        self.tickets.iter_mut().find(|t| t.id == id)
    }

    /// Find a part
    #[must_use]
    pub fn part(&self, id: &PartId) -> Option<&InventoryPart> {
        self.parts.iter().find(|p| &p.id == id)
    }

    pub(crate) fn part_mut(&mut self, id: &PartId) -> Option<&mut InventoryPart> {
        self.parts.iter_mut().find(|p| &p.id == id)
    }

    /// Find a purchase order
    #[must_use]
    pub fn purchase_order(&self, id: PurchaseOrderId) -> Option<&PurchaseOrder> {
        self.purchase_orders.iter().find(|po| po.id == id)
    }

    pub(crate) fn purchase_order_mut(&mut self, id: PurchaseOrderId) -> Option<&mut PurchaseOrder> {
        self.purchase_orders.iter_mut().find(|po| po.id == id)
    }
}
