//! Commands accepted by the ledger and the events they produce.

use crate::error::LedgerError;
use crate::inspection::InspectionFinding;
use crate::logbook::{LogbookEntry, NewLogbookEntry};
use crate::types::{
    AuditEntry, NewTicket, PartId, PartMovement, PurchaseOrder, PurchaseOrderId,
    PurchaseOrderRequest, Receipt, Role, Ticket, TicketId, TicketPatch,
};
use chrono::{DateTime, Utc};
use hotel_ops_macros::Action;
use serde::{Deserialize, Serialize};

/// Ledger actions
///
/// Commands are validated against the current state and either rejected as a
/// whole or turned into a list of events. Events carry every generated id and
/// timestamp, so applying them is deterministic.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LedgerAction {
    // ========== Commands ==========
    /// Change the active operator role
    #[command]
    SwitchRole {
        /// New role
        role: Role,
    },

    /// File a new ticket
    #[command]
    AddTicket {
        /// Ticket data
        ticket: NewTicket,
    },

    /// Merge a patch into a ticket
    #[command]
    UpdateTicket {
        /// Ticket to patch
        ticket_id: TicketId,
        /// Fields to change
        patch: TicketPatch,
        /// Audit entry text
        description: String,
    },

    /// Take a part from another room to fix a ticket
    #[command]
    CannibalizePart {
        /// Ticket receiving the part
        recipient_id: TicketId,
        /// Room the part is taken from
        donor_room: String,
        /// Part taken
        part_name: String,
    },

    /// Hold stock of a part for a ticket
    #[command]
    ReservePart {
        /// Ticket
        ticket_id: TicketId,
        /// Part
        part_id: PartId,
        /// Requested quantity, clamped to at least one
        quantity: i64,
    },

    /// Return a ticket's held stock
    #[command]
    ReleaseReservation {
        /// Ticket
        ticket_id: TicketId,
        /// Movement note
        note: Option<String>,
    },

    /// Consume a ticket's held stock
    #[command]
    IssueReservedPart {
        /// Ticket
        ticket_id: TicketId,
        /// Movement note
        note: Option<String>,
    },

    /// Manual on-hand correction
    #[command]
    AdjustStock {
        /// Part
        part_id: PartId,
        /// Signed change
        delta: i64,
        /// Movement note
        note: Option<String>,
    },

    /// Order a part
    #[command]
    CreatePurchaseOrder {
        /// Order parameters
        request: PurchaseOrderRequest,
    },

    /// Receive a purchase order, after the configured delay
    #[command]
    ReceivePurchaseOrder {
        /// Order
        po_id: PurchaseOrderId,
    },

    /// Apply a purchase order receipt
    #[command]
    ConfirmPurchaseOrderReceipt {
        /// Order
        po_id: PurchaseOrderId,
    },

    /// Record a utility reading set
    #[command]
    AddLogbookEntry {
        /// Entry data
        entry: NewLogbookEntry,
    },

    /// Stamp a room as inspected now
    #[command]
    RegisterInspection {
        /// Room
        room_number: String,
    },

    /// File a ticket from a failed inspection check
    #[command]
    SubmitInspection {
        /// Room
        room_number: String,
        /// Failed check
        finding: InspectionFinding,
    },

    /// Restore the bundled demo dataset
    #[command]
    ResetDemoData,

    // ========== Events ==========
    /// Active role changed
    #[event]
    RoleSwitched {
        /// New role
        role: Role,
    },

    /// Ticket filed
    #[event]
    TicketCreated {
        /// The new ticket
        ticket: Box<Ticket>,
    },

    /// Ticket patched
    #[event]
    TicketUpdated {
        /// Ticket
        ticket_id: TicketId,
        /// Merged fields
        patch: Box<TicketPatch>,
        /// Audit line appended
        audit: AuditEntry,
    },

    /// Reserved stock increased
    #[event]
    StockReserved {
        /// Part
        part_id: PartId,
        /// Units
        quantity: u32,
    },

    /// Reserved stock returned
    #[event]
    ReservationReleased {
        /// Part
        part_id: PartId,
        /// Units
        quantity: u32,
    },

    /// Reserved stock consumed
    #[event]
    StockIssued {
        /// Part
        part_id: PartId,
        /// Units
        quantity: u32,
    },

    /// On-hand stock corrected
    #[event]
    StockAdjusted {
        /// Part
        part_id: PartId,
        /// Signed change
        delta: i64,
    },

    /// On-hand stock received
    #[event]
    StockReceived {
        /// Part
        part_id: PartId,
        /// Units
        quantity: u32,
    },

    /// Movement appended to the log
    #[event]
    MovementRecorded {
        /// The movement
        movement: PartMovement,
    },

    /// Purchase order created
    #[event]
    PurchaseOrderCreated {
        /// The order
        order: PurchaseOrder,
    },

    /// Purchase order marked received
    #[event]
    PurchaseOrderReceived {
        /// Order
        po_id: PurchaseOrderId,
    },

    /// Logbook entry recorded
    #[event]
    LogbookEntryAdded {
        /// The entry
        entry: LogbookEntry,
    },

    /// Room inspection time overwritten
    #[event]
    InspectionRegistered {
        /// Room
        room_number: String,
        /// Inspection time
        at: DateTime<Utc>,
    },

    /// Collections replaced by the demo dataset
    #[event]
    DemoDataReset {
        /// Reset time, anchors the seeded timestamps
        at: DateTime<Utc>,
    },

    /// Command accepted
    #[event]
    CommandCompleted {
        /// Outcome
        receipt: Receipt,
    },

    /// Command rejected, state untouched
    #[event]
    CommandRejected {
        /// Reason
        error: LedgerError,
    },

    // ========== Persistence feedback ==========
    /// Every touched collection was written
    DocumentsPersisted {
        /// Keys written
        keys: Vec<String>,
    },

    /// A collection write failed
    PersistenceFailed {
        /// Backend error
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_events_are_classified() {
        let command = LedgerAction::ReceivePurchaseOrder {
            po_id: PurchaseOrderId::new(1),
        };
        assert!(command.is_command());
        assert!(!command.is_event());

        let event = LedgerAction::PurchaseOrderReceived {
            po_id: PurchaseOrderId::new(1),
        };
        assert!(event.is_event());
        assert_eq!(event.event_type(), "PurchaseOrderReceived.v1");

        let feedback = LedgerAction::PersistenceFailed {
            error: "disk full".to_string(),
        };
        assert!(!feedback.is_command() && !feedback.is_event());
        assert_eq!(feedback.name(), "PersistenceFailed");
    }
}
