//! Ledger façade.
//!
//! [`Ledger`] owns the [`Store`] and exposes one method per command, each
//! returning the command's [`Receipt`] or the [`LedgerError`] that rejected it.
//! Read models borrow the current state.

use crate::action::LedgerAction;
use crate::dashboard::{self, Dashboard};
use crate::error::{LedgerError, Result};
use crate::export;
use crate::inspection::InspectionFinding;
use crate::logbook::{LogbookEntry, NewLogbookEntry};
use crate::persistence;
use crate::reducer::{LedgerEnvironment, LedgerReducer};
use crate::seed;
use crate::state::{LedgerState, Sequences};
use crate::stock::{self, ReorderSuggestion, StockViolation};
use crate::types::{
    InventoryPart, NewTicket, PartId, PartMovement, Permissions, PurchaseOrder, PurchaseOrderId,
    PurchaseOrderRequest, Receipt, Role, Ticket, TicketId, TicketPatch, TicketStatus,
};
use chrono::{DateTime, Utc};
use hotel_ops_runtime::Store;
use std::collections::BTreeMap;

type LedgerStore = Store<LedgerState, LedgerAction, LedgerEnvironment, LedgerReducer>;

/// Hotel operations ledger
pub struct Ledger {
    store: LedgerStore,
}

impl Ledger {
    /// Ledger over `state`
    ///
    /// Id sequences are rebuilt from the collections.
    #[must_use]
    pub fn new(mut state: LedgerState, environment: LedgerEnvironment) -> Self {
        state.sequences = Sequences::rebuild(&state);
        Self {
            store: Store::new(state, LedgerReducer::new(), environment),
        }
    }

    /// Ledger over the demo dataset
    #[must_use]
    pub fn seeded(environment: LedgerEnvironment) -> Self {
        let state = seed::demo_state(environment.clock.now());
        Self::new(state, environment)
    }

    /// Ledger loaded from the environment's storage
    ///
    /// Falls back to the demo dataset without storage. The loaded collections
    /// are written back so every key exists after the first start.
    #[must_use]
    pub fn open(environment: LedgerEnvironment) -> Self {
        let now = environment.clock.now();
        let Some(storage) = environment.storage.clone() else {
            tracing::info!("no storage configured, starting from demo data");
            return Self::seeded(environment);
        };

        let namespace = environment.config.storage_namespace.clone();
        let mut state = persistence::hydrate(storage.as_ref(), &namespace, now);
        if let Err(error) = persistence::save_all(storage.as_ref(), &state, &namespace) {
            tracing::warn!(%error, "initial save failed");
            state.last_persistence_error = Some(error.to_string());
        }
        Self::new(state, environment)
    }

    fn now(&self) -> DateTime<Utc> {
        self.store.environment().clock.now()
    }

    fn dispatch(&mut self, action: LedgerAction) -> Result<Receipt> {
        let command = action.name();
        self.store
            .send(action)
            .map_err(|error| LedgerError::Internal(error.to_string()))?;
        self.store.state(|state| state.last_outcome.clone()).unwrap_or_else(|| {
            Err(LedgerError::Internal(format!("{command} produced no outcome")))
        })
    }

    // ========== Commands ==========

    /// Change the active role
    ///
    /// # Errors
    ///
    /// Never fails for a valid role; the `Result` mirrors every other command.
    pub fn switch_role(&mut self, role: Role) -> Result<Receipt> {
        self.dispatch(LedgerAction::SwitchRole { role })
    }

    /// File a ticket, returning its id in the receipt
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidInput`] when the room number is empty.
    pub fn add_ticket(&mut self, ticket: NewTicket) -> Result<Receipt> {
        self.dispatch(LedgerAction::AddTicket { ticket })
    }

    /// Merge `patch` into a ticket and append `description` to its history
    ///
    /// An unknown ticket id is ignored.
    ///
    /// # Errors
    ///
    /// Only internal runtime failures.
    pub fn update_ticket(
        &mut self,
        ticket_id: TicketId,
        patch: TicketPatch,
        description: impl Into<String>,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::UpdateTicket {
            ticket_id,
            patch,
            description: description.into(),
        })
    }

    /// Take `part_name` from `donor_room` to fix the recipient ticket
    ///
    /// Files a blocking Waiting-Part ticket for the donor room.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] for an unknown recipient,
    /// [`LedgerError::InvalidInput`] for an empty room or part name.
    pub fn cannibalize_part(
        &mut self,
        recipient_id: TicketId,
        donor_room: impl Into<String>,
        part_name: impl Into<String>,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::CannibalizePart {
            recipient_id,
            donor_room: donor_room.into(),
            part_name: part_name.into(),
        })
    }

    /// Reserve `quantity` units of a part for a ticket
    ///
    /// Quantities below one are treated as one. A ticket's previous
    /// reservation is released first.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PermissionDenied`], [`LedgerError::NotFound`] or
    /// [`LedgerError::InsufficientStock`].
    pub fn reserve_part_for_ticket(
        &mut self,
        ticket_id: TicketId,
        part_id: impl Into<PartId>,
        quantity: i64,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::ReservePart {
            ticket_id,
            part_id: part_id.into(),
            quantity,
        })
    }

    /// Return a ticket's reserved stock
    ///
    /// # Errors
    ///
    /// [`LedgerError::PermissionDenied`], or [`LedgerError::NotFound`] when
    /// the ticket holds no reservation.
    pub fn release_reservation_for_ticket(
        &mut self,
        ticket_id: TicketId,
        note: Option<String>,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::ReleaseReservation { ticket_id, note })
    }

    /// Consume a ticket's reserved stock
    ///
    /// # Errors
    ///
    /// [`LedgerError::PermissionDenied`], or [`LedgerError::NotFound`] when
    /// the ticket holds no reservation.
    pub fn issue_reserved_part_for_ticket(
        &mut self,
        ticket_id: TicketId,
        note: Option<String>,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::IssueReservedPart { ticket_id, note })
    }

    /// Correct on-hand stock by `delta`, floored at zero
    ///
    /// # Errors
    ///
    /// [`LedgerError::PermissionDenied`], [`LedgerError::NotFound`], or
    /// [`LedgerError::InvalidInput`] for a zero delta.
    pub fn adjust_stock(
        &mut self,
        part_id: impl Into<PartId>,
        delta: i64,
        note: Option<String>,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::AdjustStock {
            part_id: part_id.into(),
            delta,
            note,
        })
    }

    /// Order a part, returning the order id in the receipt
    ///
    /// # Errors
    ///
    /// [`LedgerError::PermissionDenied`] or [`LedgerError::NotFound`].
    pub fn create_po_for_part(&mut self, request: PurchaseOrderRequest) -> Result<Receipt> {
        self.dispatch(LedgerAction::CreatePurchaseOrder { request })
    }

    /// Receive every line of a purchase order into stock
    ///
    /// Blocks for the configured receipt delay.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PermissionDenied`], [`LedgerError::NotFound`],
    /// [`LedgerError::AlreadyFinalized`] for a received order, or
    /// [`LedgerError::InvalidInput`] for a canceled one.
    pub fn receive_po(&mut self, po_id: PurchaseOrderId) -> Result<Receipt> {
        self.dispatch(LedgerAction::ReceivePurchaseOrder { po_id })
    }

    /// Record a utility reading set
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidInput`] for a non-finite reading.
    pub fn add_logbook_entry(&mut self, entry: NewLogbookEntry) -> Result<Receipt> {
        self.dispatch(LedgerAction::AddLogbookEntry { entry })
    }

    /// Stamp a room as inspected now
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidInput`] when the room number is empty.
    pub fn register_inspection(&mut self, room_number: impl Into<String>) -> Result<Receipt> {
        self.dispatch(LedgerAction::RegisterInspection {
            room_number: room_number.into(),
        })
    }

    /// File a ticket for a failed inspection check and stamp the room
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidInput`] for an empty room,
    /// [`LedgerError::NotFound`] for an unknown part.
    pub fn submit_inspection(
        &mut self,
        room_number: impl Into<String>,
        finding: InspectionFinding,
    ) -> Result<Receipt> {
        self.dispatch(LedgerAction::SubmitInspection {
            room_number: room_number.into(),
            finding,
        })
    }

    /// Restore the demo dataset and the Management role
    ///
    /// # Errors
    ///
    /// Only internal runtime failures.
    pub fn reset_demo_data(&mut self) -> Result<Receipt> {
        self.dispatch(LedgerAction::ResetDemoData)
    }

    // ========== Ticket lifecycle ==========

    /// Assign a technician and start work
    ///
    /// # Errors
    ///
    /// See [`Ledger::update_ticket`].
    pub fn assign_ticket(&mut self, ticket_id: TicketId, technician: &str) -> Result<Receipt> {
        let patch = TicketPatch::new()
            .assigned_to(technician)
            .status(TicketStatus::InProgress);
        self.update_ticket(ticket_id, patch, format!("Assigned to {technician}"))
    }

    /// Move a ticket to In Progress
    ///
    /// # Errors
    ///
    /// See [`Ledger::update_ticket`].
    pub fn start_work(&mut self, ticket_id: TicketId) -> Result<Receipt> {
        let patch = TicketPatch::new().status(TicketStatus::InProgress);
        self.update_ticket(ticket_id, patch, "Work started")
    }

    /// Hand a ticket to an outside vendor
    ///
    /// # Errors
    ///
    /// See [`Ledger::update_ticket`].
    pub fn escalate_to_vendor(&mut self, ticket_id: TicketId, vendor_type: &str) -> Result<Receipt> {
        let patch = TicketPatch {
            status: Some(TicketStatus::Vendor),
            needs_vendor: Some(true),
            vendor_type: Some(vendor_type.to_string()),
            ..TicketPatch::default()
        };
        self.update_ticket(ticket_id, patch, format!("Escalated to vendor: {vendor_type}"))
    }

    /// Mark a ticket resolved with the time spent
    ///
    /// # Errors
    ///
    /// See [`Ledger::update_ticket`].
    pub fn resolve_ticket(
        &mut self,
        ticket_id: TicketId,
        time_spent_minutes: u32,
        evidence_url: Option<String>,
    ) -> Result<Receipt> {
        let patch = TicketPatch {
            status: Some(TicketStatus::Resolved),
            time_spent_minutes: Some(time_spent_minutes),
            evidence_url,
            ..TicketPatch::default()
        };
        self.update_ticket(ticket_id, patch, format!("Resolved in {time_spent_minutes} min."))
    }

    /// Close a resolved ticket
    ///
    /// # Errors
    ///
    /// See [`Ledger::update_ticket`].
    pub fn verify_ticket(&mut self, ticket_id: TicketId, verifier: &str) -> Result<Receipt> {
        let patch = TicketPatch {
            status: Some(TicketStatus::Verified),
            verified_by: Some(verifier.to_string()),
            closed_at: Some(self.now()),
            ..TicketPatch::default()
        };
        self.update_ticket(ticket_id, patch, format!("Verified by {verifier}"))
    }

    // ========== Read models ==========

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &LedgerState {
        self.store.snapshot()
    }

    /// Tickets, newest first
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.state().tickets
    }

    /// Find a ticket
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.state().ticket(id)
    }

    /// Parts catalogue
    #[must_use]
    pub fn parts(&self) -> &[InventoryPart] {
        &self.state().parts
    }

    /// Find a part
    #[must_use]
    pub fn part(&self, id: &PartId) -> Option<&InventoryPart> {
        self.state().part(id)
    }

    /// Purchase orders, newest first
    #[must_use]
    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.state().purchase_orders
    }

    /// Movement log, oldest first
    #[must_use]
    pub fn movements(&self) -> &[PartMovement] {
        &self.state().movements
    }

    /// Logbook, newest first
    #[must_use]
    pub fn logbook(&self) -> &[LogbookEntry] {
        &self.state().logbook
    }

    /// Last inspection time per room
    #[must_use]
    pub fn inspections(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.state().inspections
    }

    /// Active role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.state().role
    }

    /// Permissions of the active role
    #[must_use]
    pub const fn permissions(&self) -> Permissions {
        self.role().permissions()
    }

    /// Ticket counters as of now
    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        dashboard::dashboard(self.tickets(), self.now())
    }

    /// Parts to reorder
    #[must_use]
    pub fn shopping_list(&self) -> Vec<ReorderSuggestion> {
        let state = self.state();
        stock::shopping_list(
            &state.parts,
            &state.tickets,
            &state.purchase_orders,
            self.store.environment().config.reorder_target_factor,
        )
    }

    /// Parts whose reserved count exceeds on-hand
    #[must_use]
    pub fn stock_invariant_violations(&self) -> Vec<StockViolation> {
        stock::stock_invariant_violations(self.parts())
    }

    /// Pending tickets scoring strictly above the configured flame threshold
    #[must_use]
    pub fn flame_tickets(&self) -> Vec<&Ticket> {
        let threshold = self.store.environment().config.flame_threshold;
        self.tickets()
            .iter()
            .filter(|t| t.status.is_pending() && t.is_flame(threshold))
            .collect()
    }

    /// Tickets as CSV
    #[must_use]
    pub fn export_csv(&self) -> String {
        export::tickets_csv(self.tickets())
    }

    /// Most recent persistence failure, if the last save did not succeed
    #[must_use]
    pub fn last_persistence_error(&self) -> Option<&str> {
        self.state().last_persistence_error.as_deref()
    }

    /// Number of accepted commands
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.state().revision
    }
}
