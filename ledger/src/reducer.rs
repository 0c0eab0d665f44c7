//! Ledger reducer.
//!
//! Commands are decided against an immutable view of the state: validation
//! either rejects the command or produces the complete list of events it
//! implies. Only then are the events applied, so a rejected command leaves the
//! state untouched and a multi-entity command (reserve, cannibalize, receive)
//! is all-or-nothing. After applying, the touched collections are handed to
//! the storage backend as a save effect.

use crate::action::LedgerAction;
use crate::config::LedgerConfig;
use crate::error::{EntityKind, LedgerError, Result};
use crate::inspection::InspectionFinding;
use crate::logbook::{self, LogbookEntry, NewLogbookEntry};
use crate::persistence::{self, Collection};
use crate::seed;
use crate::state::{LedgerState, Sequences};
use crate::types::{
    AuditEntry, Capability, Impact, InventoryPart, MovementKind, NewTicket, PartId, PartMovement,
    PurchaseOrder, PurchaseOrderId, PurchaseOrderLine, PurchaseOrderRequest, PurchaseOrderStatus,
    Receipt, Role, Ticket, TicketId, TicketOrigin, TicketPatch, TicketStatus, Urgency,
};
use chrono::{DateTime, Duration, Utc};
use hotel_ops_core::effect::Effect;
use hotel_ops_core::environment::Clock;
use hotel_ops_core::reducer::Reducer;
use hotel_ops_core::storage::KeyValueStore;
use hotel_ops_core::{delay, save_documents, smallvec, SmallVec};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Environment for the ledger containing dependencies
#[derive(Clone)]
pub struct LedgerEnvironment {
    /// Clock for generating timestamps
    pub clock: Arc<dyn Clock>,
    /// Backend the collections are mirrored to, if any
    pub storage: Option<Arc<dyn KeyValueStore>>,
    /// Settings
    pub config: LedgerConfig,
}

impl LedgerEnvironment {
    /// Creates an environment without persistence
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, config: LedgerConfig) -> Self {
        Self {
            clock,
            storage: None,
            config,
        }
    }

    /// Mirror collections to `storage`
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }
}

/// Reducer implementing the ledger's business rules
#[derive(Clone, Debug, Default)]
pub struct LedgerReducer;

impl LedgerReducer {
    /// Creates a new ledger reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    ///
    /// Deterministic: every id and timestamp comes from the event. Commands
    /// are ignored.
    pub fn apply_event(state: &mut LedgerState, action: &LedgerAction) {
        match action {
            LedgerAction::RoleSwitched { role } => state.role = *role,
            LedgerAction::TicketCreated { ticket } => {
                state.sequences.observe_ticket(ticket.id);
                state.tickets.insert(0, ticket.as_ref().clone());
            },
            LedgerAction::TicketUpdated {
                ticket_id,
                patch,
                audit,
            } => {
                if let Some(ticket) = state.ticket_mut(*ticket_id) {
                    ticket.record(patch, audit.clone());
                }
            },
            LedgerAction::StockReserved { part_id, quantity } => {
                if let Some(part) = state.part_mut(part_id) {
                    part.reserved = part.reserved.saturating_add(*quantity);
                }
            },
            LedgerAction::ReservationReleased { part_id, quantity } => {
                if let Some(part) = state.part_mut(part_id) {
                    part.reserved = part.reserved.saturating_sub(*quantity);
                }
            },
            LedgerAction::StockIssued { part_id, quantity } => {
                if let Some(part) = state.part_mut(part_id) {
                    part.reserved = part.reserved.saturating_sub(*quantity);
                    part.on_hand = part.on_hand.saturating_sub(*quantity);
                }
            },
            LedgerAction::StockAdjusted { part_id, delta } => {
                if let Some(part) = state.part_mut(part_id) {
                    part.on_hand = apply_delta(part.on_hand, *delta);
                }
            },
            LedgerAction::StockReceived { part_id, quantity } => {
                if let Some(part) = state.part_mut(part_id) {
                    part.on_hand = part.on_hand.saturating_add(*quantity);
                }
            },
            LedgerAction::MovementRecorded { movement } => {
                state.sequences.observe_movement(movement.id);
                state.movements.push(movement.clone());
            },
            LedgerAction::PurchaseOrderCreated { order } => {
                state.sequences.observe_purchase_order(order.id);
                state.purchase_orders.insert(0, order.clone());
            },
            LedgerAction::PurchaseOrderReceived { po_id } => {
                if let Some(order) = state.purchase_order_mut(*po_id) {
                    order.status = PurchaseOrderStatus::Received;
                }
            },
            LedgerAction::LogbookEntryAdded { entry } => {
                state.sequences.observe_logbook(entry.id);
                state.logbook.insert(0, entry.clone());
            },
            LedgerAction::InspectionRegistered { room_number, at } => {
                state.inspections.insert(room_number.clone(), *at);
            },
            LedgerAction::DemoDataReset { at } => {
                let seeded = seed::demo_state(*at);
                *state = LedgerState {
                    role: Role::Management,
                    revision: state.revision,
                    last_outcome: state.last_outcome.take(),
                    last_persistence_error: state.last_persistence_error.take(),
                    ..seeded
                };
            },
            LedgerAction::CommandCompleted { receipt } => {
                state.last_outcome = Some(Ok(receipt.clone()));
            },
            LedgerAction::CommandRejected { error } => {
                state.last_outcome = Some(Err(error.clone()));
            },
            LedgerAction::DocumentsPersisted { .. } => state.last_persistence_error = None,
            LedgerAction::PersistenceFailed { error } => {
                state.last_persistence_error = Some(error.clone());
            },
            // Commands are decided, never applied
            LedgerAction::SwitchRole { .. }
            | LedgerAction::AddTicket { .. }
            | LedgerAction::UpdateTicket { .. }
            | LedgerAction::CannibalizePart { .. }
            | LedgerAction::ReservePart { .. }
            | LedgerAction::ReleaseReservation { .. }
            | LedgerAction::IssueReservedPart { .. }
            | LedgerAction::AdjustStock { .. }
            | LedgerAction::CreatePurchaseOrder { .. }
            | LedgerAction::ReceivePurchaseOrder { .. }
            | LedgerAction::ConfirmPurchaseOrderReceipt { .. }
            | LedgerAction::AddLogbookEntry { .. }
            | LedgerAction::RegisterInspection { .. }
            | LedgerAction::SubmitInspection { .. }
            | LedgerAction::ResetDemoData => {},
        }
    }

    /// Validate a command into the events it implies
    fn decide(
        state: &LedgerState,
        command: LedgerAction,
        now: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Result<(Vec<LedgerAction>, Receipt)> {
        let mut decision = Decision::new(state, now);
        let receipt = match command {
            LedgerAction::SwitchRole { role } => {
                decision.emit(LedgerAction::RoleSwitched { role });
                Receipt::new(format!("Role switched to {role}"))
            },
            LedgerAction::AddTicket { ticket } => decision.add_ticket(ticket)?,
            LedgerAction::UpdateTicket {
                ticket_id,
                patch,
                description,
            } => {
                let Some(ticket) = state.ticket(ticket_id) else {
                    return Ok((Vec::new(), Receipt::new("Nothing to update")));
                };
                if ticket.reservation().is_some() && patch.touches_part_linkage() {
                    return Err(LedgerError::InvalidInput(format!(
                        "{ticket_id} holds a reservation; release or issue it before editing the part"
                    )));
                }
                decision.update_ticket(ticket_id, patch, description);
                Receipt::new(format!("Ticket {ticket_id} updated")).with_ticket(ticket_id)
            },
            LedgerAction::CannibalizePart {
                recipient_id,
                donor_room,
                part_name,
            } => decision.cannibalize(recipient_id, &donor_room, &part_name)?,
            LedgerAction::ReservePart {
                ticket_id,
                part_id,
                quantity,
            } => decision.reserve(ticket_id, &part_id, quantity)?,
            LedgerAction::ReleaseReservation { ticket_id, note } => {
                decision.release(ticket_id, note)?
            },
            LedgerAction::IssueReservedPart { ticket_id, note } => decision.issue(ticket_id, note)?,
            LedgerAction::AdjustStock {
                part_id,
                delta,
                note,
            } => decision.adjust(&part_id, delta, note)?,
            LedgerAction::CreatePurchaseOrder { request } => {
                decision.create_purchase_order(request, config)?
            },
            LedgerAction::ReceivePurchaseOrder { po_id }
            | LedgerAction::ConfirmPurchaseOrderReceipt { po_id } => decision.receive(po_id)?,
            LedgerAction::AddLogbookEntry { entry } => decision.add_logbook_entry(entry)?,
            LedgerAction::RegisterInspection { room_number } => {
                let room_number = required(room_number, "room number")?;
                decision.emit(LedgerAction::InspectionRegistered {
                    room_number: room_number.clone(),
                    at: now,
                });
                Receipt::new(format!("Inspection registered for room {room_number}"))
            },
            LedgerAction::SubmitInspection {
                room_number,
                finding,
            } => decision.submit_inspection(room_number, finding)?,
            LedgerAction::ResetDemoData => {
                decision.emit(LedgerAction::DemoDataReset { at: now });
                Receipt::new("Demo data restored")
            },
            other => {
                return Err(LedgerError::Internal(format!(
                    "{} is not a command",
                    other.name()
                )));
            },
        };
        Ok((decision.events, receipt))
    }

    fn reject(
        state: &mut LedgerState,
        command: &'static str,
        error: LedgerError,
    ) -> SmallVec<[Effect<LedgerAction>; 4]> {
        tracing::warn!(command, %error, "command rejected");
        Self::apply_event(state, &LedgerAction::CommandRejected { error });
        SmallVec::new()
    }

    fn handle_command(
        state: &mut LedgerState,
        command: LedgerAction,
        env: &LedgerEnvironment,
    ) -> SmallVec<[Effect<LedgerAction>; 4]> {
        state.last_outcome = None;
        let name = command.name();
        let now = env.clock.now();

        if let LedgerAction::ReceivePurchaseOrder { po_id } = &command {
            let receipt_delay = env.config.po_receipt_delay;
            if !receipt_delay.is_zero() {
                let receivable = Decision::new(state, now).receivable(*po_id).map(|_| ());
                return match receivable {
                    Ok(()) => {
                        tracing::debug!(po = %po_id, ?receipt_delay, "purchase order receipt scheduled");
                        smallvec![delay! {
                            duration: receipt_delay,
                            action: LedgerAction::ConfirmPurchaseOrderReceipt { po_id: *po_id }
                        }]
                    },
                    Err(error) => Self::reject(state, name, error),
                };
            }
        }

        match Self::decide(state, command, now, &env.config) {
            Ok((events, receipt)) => {
                for event in &events {
                    tracing::trace!(command = name, event = event.event_type(), "applying event");
                    Self::apply_event(state, event);
                }
                tracing::debug!(command = name, events = events.len(), message = %receipt.message, "command applied");
                Self::apply_event(state, &LedgerAction::CommandCompleted { receipt });

                if events.is_empty() {
                    return SmallVec::new();
                }
                state.bump_revision();
                Self::persist(state, &events, env)
            },
            Err(error) => Self::reject(state, name, error),
        }
    }

    /// Save effect for every collection the events touched
    fn persist(
        state: &mut LedgerState,
        events: &[LedgerAction],
        env: &LedgerEnvironment,
    ) -> SmallVec<[Effect<LedgerAction>; 4]> {
        let Some(storage) = env.storage.as_ref() else {
            return SmallVec::new();
        };
        let collections: BTreeSet<Collection> =
            events.iter().flat_map(|event| touched_collections(event).iter().copied()).collect();
        if collections.is_empty() {
            return SmallVec::new();
        }

        match persistence::snapshot_documents(state, collections, &env.config.storage_namespace) {
            Ok(documents) => {
                let keys: Vec<String> = documents.iter().map(|(key, _)| key.clone()).collect();
                smallvec![save_documents! {
                    store: *storage,
                    documents: documents,
                    on_success: || Some(LedgerAction::DocumentsPersisted { keys }),
                    on_error: |error| Some(LedgerAction::PersistenceFailed {
                        error: error.to_string(),
                    })
                }]
            },
            Err(error) => {
                tracing::warn!(%error, "collections could not be encoded");
                state.last_persistence_error = Some(error.to_string());
                SmallVec::new()
            },
        }
    }
}

impl Reducer for LedgerReducer {
    type State = LedgerState;
    type Action = LedgerAction;
    type Environment = LedgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.is_command() {
            return Self::handle_command(state, action, env);
        }

        match &action {
            LedgerAction::DocumentsPersisted { keys } => {
                tracing::debug!(documents = keys.len(), "collections persisted");
            },
            LedgerAction::PersistenceFailed { error } => {
                tracing::warn!(%error, "collections could not be persisted");
            },
            _ => {},
        }
        // Events arriving directly are replayed
        Self::apply_event(state, &action);
        SmallVec::new()
    }
}

/// Collections an event changes
const fn touched_collections(event: &LedgerAction) -> &'static [Collection] {
    match event {
        LedgerAction::TicketCreated { .. } | LedgerAction::TicketUpdated { .. } => {
            &[Collection::Tickets]
        },
        LedgerAction::StockReserved { .. }
        | LedgerAction::ReservationReleased { .. }
        | LedgerAction::StockIssued { .. }
        | LedgerAction::StockAdjusted { .. }
        | LedgerAction::StockReceived { .. } => &[Collection::Parts],
        LedgerAction::MovementRecorded { .. } => &[Collection::Movements],
        LedgerAction::PurchaseOrderCreated { .. } | LedgerAction::PurchaseOrderReceived { .. } => {
            &[Collection::PurchaseOrders]
        },
        LedgerAction::LogbookEntryAdded { .. } => &[Collection::Logbook],
        LedgerAction::InspectionRegistered { .. } => &[Collection::Inspections],
        LedgerAction::DemoDataReset { .. } => &Collection::ALL,
        _ => &[],
    }
}

/// Requested quantity, at least one
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(1)).unwrap_or(u32::MAX)
}

/// Signed change floored at zero
fn apply_delta(on_hand: u32, delta: i64) -> u32 {
    let next = i64::from(on_hand).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

fn required(value: String, what: &str) -> Result<String> {
    if value.trim().is_empty() {
        Err(LedgerError::InvalidInput(format!("{what} is required")))
    } else {
        Ok(value)
    }
}

/// Events being collected for one command
struct Decision<'a> {
    state: &'a LedgerState,
    sequences: Sequences,
    now: DateTime<Utc>,
    events: Vec<LedgerAction>,
}

impl<'a> Decision<'a> {
    fn new(state: &'a LedgerState, now: DateTime<Utc>) -> Self {
        Self {
            state,
            sequences: state.sequences.clone(),
            now,
            events: Vec::new(),
        }
    }

    fn emit(&mut self, event: LedgerAction) {
        self.events.push(event);
    }

    fn actor(&self) -> Role {
        self.state.role
    }

    fn require(&self, capability: Capability) -> Result<()> {
        let role = self.actor();
        if role.permissions().allows(capability) {
            Ok(())
        } else {
            Err(LedgerError::PermissionDenied { role, capability })
        }
    }

    fn ticket(&self, id: TicketId) -> Result<&'a Ticket> {
        self.state
            .ticket(id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Ticket, id))
    }

    fn part(&self, id: &PartId) -> Result<&'a InventoryPart> {
        self.state
            .part(id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Part, id))
    }

    fn audit(&self, action: impl Into<String>) -> AuditEntry {
        AuditEntry::new(self.now, action, self.actor().to_string())
    }

    fn update_ticket(&mut self, ticket_id: TicketId, patch: TicketPatch, action: impl Into<String>) {
        let audit = self.audit(action);
        self.emit(LedgerAction::TicketUpdated {
            ticket_id,
            patch: Box::new(patch),
            audit,
        });
    }

    fn movement(&mut self, kind: MovementKind, part_id: &PartId, quantity: u32) -> PartMovement {
        PartMovement {
            id: self.sequences.next_movement(),
            part_id: part_id.clone(),
            kind,
            quantity,
            at: self.now,
            actor: self.actor(),
            note: None,
            ticket_id: None,
            po_id: None,
        }
    }

    fn record(&mut self, movement: PartMovement) {
        self.emit(LedgerAction::MovementRecorded { movement });
    }

    fn add_ticket(&mut self, data: NewTicket) -> Result<Receipt> {
        if data.room_number.trim().is_empty() {
            return Err(LedgerError::InvalidInput("room number is required".to_string()));
        }
        let id = self.sequences.next_ticket();
        let ticket = Ticket::create(id, data, self.now, self.actor());
        self.emit(LedgerAction::TicketCreated {
            ticket: Box::new(ticket),
        });
        Ok(Receipt::new(format!("Ticket {id} created")).with_ticket(id))
    }

    fn cannibalize(
        &mut self,
        recipient_id: TicketId,
        donor_room: &str,
        part_name: &str,
    ) -> Result<Receipt> {
        let recipient = self.ticket(recipient_id)?;
        let donor_room = required(donor_room.to_string(), "donor room")?;
        let part_name = required(part_name.to_string(), "part name")?;

        let donor_id = self.sequences.next_ticket();
        let mut data = NewTicket::new(
            donor_room.clone(),
            recipient.asset.clone(),
            "Missing part (cannibalized)",
            format!(
                "Part taken ({part_name}) to repair room {}. Replace urgently.",
                recipient.room_number
            ),
        )
        .severity(Urgency::High, Impact::Blocking)
        .with_status(TicketStatus::WaitingPart)
        .with_origin(TicketOrigin::System)
        .created_by(Role::Maintenance)
        .with_note(format!("Part taken for ticket {recipient_id}"));
        data.needs_part = true;
        data.part_name = Some(part_name);
        data.part_qty = Some(1);

        let mut donor = Ticket::create(donor_id, data, self.now, self.actor());
        donor.maintenance_type = recipient.maintenance_type;
        donor.history = vec![self.audit(format!(
            "Automatic ticket from cannibalization for room {}",
            recipient.room_number
        ))];
        self.emit(LedgerAction::TicketCreated {
            ticket: Box::new(donor),
        });

        let patch = TicketPatch {
            note: Some(format!("Part taken from room {donor_room}")),
            cannibalized_from_room: Some(donor_room.clone()),
            ..TicketPatch::default()
        };
        self.update_ticket(recipient_id, patch, format!("Part cannibalized from room {donor_room}"));

        Ok(Receipt::new(format!("Ticket {donor_id} created for room {donor_room}")).with_ticket(donor_id))
    }

    fn reserve(&mut self, ticket_id: TicketId, part_id: &PartId, quantity: i64) -> Result<Receipt> {
        self.require(Capability::Reserve)?;
        let ticket = self.ticket(ticket_id)?;
        let part = self.part(part_id)?;
        let quantity = clamp_quantity(quantity);

        let available = part.available();
        if available < quantity {
            return Err(LedgerError::InsufficientStock {
                part_id: part.id.clone(),
                requested: quantity,
                available,
            });
        }

        if let Some(prior) = ticket.reservation() {
            self.emit(LedgerAction::ReservationReleased {
                part_id: prior.part_id.clone(),
                quantity: prior.quantity,
            });
            let movement = self
                .movement(MovementKind::Release, &prior.part_id, prior.quantity)
                .with_note("Replaced by new reservation")
                .for_ticket(ticket_id);
            self.record(movement);
        }

        self.emit(LedgerAction::StockReserved {
            part_id: part.id.clone(),
            quantity,
        });
        let patch = TicketPatch {
            needs_part: Some(true),
            status: Some(TicketStatus::WaitingPart),
            part_id: Some(part.id.clone()),
            part_name: Some(part.name.clone()),
            part_qty: Some(quantity),
            ..TicketPatch::default()
        };
        self.update_ticket(ticket_id, patch, format!("Reserved part: {} (x{quantity})", part.name));
        let movement = self
            .movement(MovementKind::Reserve, &part.id, quantity)
            .with_note(format!("Reserved for ticket {ticket_id}"))
            .for_ticket(ticket_id);
        self.record(movement);

        Ok(Receipt::new("Reserved successfully").with_ticket(ticket_id))
    }

    fn release(&mut self, ticket_id: TicketId, note: Option<String>) -> Result<Receipt> {
        self.require(Capability::Reserve)?;
        let reservation = self
            .ticket(ticket_id)?
            .reservation()
            .ok_or_else(|| LedgerError::not_found(EntityKind::Reservation, ticket_id))?;

        self.emit(LedgerAction::ReservationReleased {
            part_id: reservation.part_id.clone(),
            quantity: reservation.quantity,
        });
        let movement = self
            .movement(MovementKind::Release, &reservation.part_id, reservation.quantity)
            .with_note(note.unwrap_or_else(|| "Released".to_string()))
            .for_ticket(ticket_id);
        self.record(movement);
        let patch = TicketPatch {
            needs_part: Some(false),
            ..TicketPatch::default()
        };
        self.update_ticket(ticket_id, patch, "Reservation released");

        Ok(Receipt::new("Released successfully").with_ticket(ticket_id))
    }

    fn issue(&mut self, ticket_id: TicketId, note: Option<String>) -> Result<Receipt> {
        self.require(Capability::Reserve)?;
        let reservation = self
            .ticket(ticket_id)?
            .reservation()
            .ok_or_else(|| LedgerError::not_found(EntityKind::Reservation, ticket_id))?;
        let part = self.part(&reservation.part_id)?;
        let quantity = reservation.quantity;

        self.emit(LedgerAction::StockIssued {
            part_id: part.id.clone(),
            quantity,
        });
        let movement = self
            .movement(MovementKind::Issue, &part.id, quantity)
            .with_note(note.unwrap_or_else(|| "Consumed".to_string()))
            .for_ticket(ticket_id);
        self.record(movement);
        let patch = TicketPatch {
            needs_part: Some(false),
            ..TicketPatch::default()
        };
        self.update_ticket(ticket_id, patch, format!("Part used: {} (x{quantity})", part.name));

        Ok(Receipt::new("Consumed successfully").with_ticket(ticket_id))
    }

    fn adjust(&mut self, part_id: &PartId, delta: i64, note: Option<String>) -> Result<Receipt> {
        self.require(Capability::AdjustStock)?;
        if delta == 0 {
            return Err(LedgerError::InvalidInput("stock delta cannot be zero".to_string()));
        }
        let part = self.part(part_id)?;

        self.emit(LedgerAction::StockAdjusted {
            part_id: part.id.clone(),
            delta,
        });
        let quantity = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
        let mut movement = self.movement(MovementKind::Adjust, &part.id, quantity);
        movement.note = note;
        self.record(movement);

        Ok(Receipt::new("Stock adjusted"))
    }

    fn create_purchase_order(
        &mut self,
        request: PurchaseOrderRequest,
        config: &LedgerConfig,
    ) -> Result<Receipt> {
        self.require(Capability::CreatePurchaseOrder)?;
        let part = self.part(&request.part_id)?;
        let quantity = clamp_quantity(request.quantity);

        let vendor = request
            .vendor
            .filter(|vendor| !vendor.trim().is_empty())
            .or_else(|| part.preferred_vendor.clone())
            .unwrap_or_else(|| config.vendor_placeholder.clone());
        let eta_days = request
            .eta_days
            .or(part.lead_time_days)
            .unwrap_or(config.default_eta_days);
        let eta = Duration::try_days(i64::from(eta_days))
            .and_then(|lead| self.now.checked_add_signed(lead))
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!("ETA of {eta_days} days is out of range"))
            })?;

        let id = self.sequences.next_purchase_order();
        self.emit(LedgerAction::PurchaseOrderCreated {
            order: PurchaseOrder {
                id,
                status: PurchaseOrderStatus::Ordered,
                created_at: self.now,
                created_by: self.actor(),
                vendor,
                eta: Some(eta),
                lines: vec![PurchaseOrderLine {
                    part_id: part.id.clone(),
                    part_name: part.name.clone(),
                    quantity,
                    unit: Some(part.unit.clone()),
                }],
                notes: Some("Generated purchase order".to_string()),
            },
        });

        let mut movement = self
            .movement(MovementKind::PoCreated, &part.id, quantity)
            .with_note(format!("PO {id}"))
            .for_po(id);
        movement.ticket_id = request.ticket_id;
        self.record(movement);

        // Linking to an unknown ticket is skipped, like any other ticket update
        if let Some(ticket_id) = request.ticket_id.filter(|t| self.state.ticket(*t).is_some()) {
            let patch = TicketPatch {
                po_id: Some(id),
                ..TicketPatch::default()
            };
            self.update_ticket(ticket_id, patch, format!("PO linked: {id}"));
        }

        Ok(Receipt::new(format!("PO {id} created")).with_po(id))
    }

    fn receivable(&self, po_id: PurchaseOrderId) -> Result<&'a PurchaseOrder> {
        self.require(Capability::CreatePurchaseOrder)?;
        let order = self
            .state
            .purchase_order(po_id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::PurchaseOrder, po_id))?;
        match order.status {
            PurchaseOrderStatus::Received => Err(LedgerError::AlreadyFinalized(po_id)),
            PurchaseOrderStatus::Canceled => Err(LedgerError::InvalidInput(format!(
                "purchase order {po_id} was canceled"
            ))),
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Ordered => Ok(order),
        }
    }

    fn receive(&mut self, po_id: PurchaseOrderId) -> Result<Receipt> {
        let order = self.receivable(po_id)?;

        for line in &order.lines {
            self.emit(LedgerAction::StockReceived {
                part_id: line.part_id.clone(),
                quantity: line.quantity,
            });
            let movement = self
                .movement(MovementKind::Receive, &line.part_id, line.quantity)
                .with_note(format!("Receipt of PO {po_id}"))
                .for_po(po_id);
            self.record(movement);
        }
        self.emit(LedgerAction::PurchaseOrderReceived { po_id });
        if let Some(first) = order.lines.first() {
            let movement = self
                .movement(MovementKind::PoReceived, &first.part_id, order.total_quantity())
                .with_note(format!("PO {po_id} received"))
                .for_po(po_id);
            self.record(movement);
        }

        Ok(Receipt::new(format!("PO {po_id} received")).with_po(po_id))
    }

    fn add_logbook_entry(&mut self, entry: NewLogbookEntry) -> Result<Receipt> {
        if let Some((key, _)) = entry.readings.iter().find(|(_, value)| !value.is_finite()) {
            return Err(LedgerError::InvalidInput(format!("reading '{key}' is not a number")));
        }
        let id = self.sequences.next_logbook();
        let status = logbook::evaluate(entry.kind, &entry.readings);
        self.emit(LedgerAction::LogbookEntryAdded {
            entry: LogbookEntry {
                id,
                at: self.now,
                kind: entry.kind,
                readings: entry.readings,
                recorded_by: self.actor(),
                status,
                notes: entry.notes,
            },
        });
        Ok(Receipt::new(format!("Logbook entry {id} recorded")))
    }

    fn submit_inspection(&mut self, room_number: String, finding: InspectionFinding) -> Result<Receipt> {
        let room_number = required(room_number, "room number")?;
        let part = finding
            .part_id
            .as_ref()
            .map(|part_id| self.part(part_id))
            .transpose()?;

        let data = NewTicket::new(
            room_number.clone(),
            finding.asset.clone(),
            finding.issue_type.clone(),
            finding.ticket_description(),
        )
        .severity(finding.urgency, Impact::Annoying)
        .created_by(Role::Supervisor);
        let data = match part {
            Some(part) => data
                .needing_part(part.id.clone(), part.name.clone(), 1)
                .with_status(TicketStatus::WaitingPart)
                .with_note(format!("Requires part: {}", part.name)),
            None => data.with_note("Filed from supervisor inspection"),
        };

        let receipt = self.add_ticket(data)?;
        self.emit(LedgerAction::InspectionRegistered {
            room_number,
            at: self.now,
        });
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hotel_ops_testing::{assertions, test_clock, InMemoryKeyValueStore, ReducerTest};
    use std::time::Duration as StdDuration;

    fn env() -> LedgerEnvironment {
        LedgerEnvironment::new(Arc::new(test_clock()), LedgerConfig::default())
    }

    fn stored_env() -> LedgerEnvironment {
        env().with_storage(Arc::new(InMemoryKeyValueStore::new()))
    }

    fn state() -> LedgerState {
        seed::demo_state(test_clock().now())
    }

    fn part(state: &LedgerState, id: &str) -> InventoryPart {
        state.part(&PartId::from(id)).cloned().unwrap()
    }

    #[test]
    fn reserve_holds_stock_and_links_ticket() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(state())
            .when_action(LedgerAction::ReservePart {
                ticket_id: TicketId::new(8003),
                part_id: PartId::from("P-001"),
                quantity: 1,
            })
            .then_state(|state| {
                assert_eq!(part(state, "P-001").reserved, 1);
                let ticket = state.ticket(TicketId::new(8003)).unwrap();
                assert_eq!(ticket.status, TicketStatus::WaitingPart);
                assert_eq!(ticket.reservation().map(|r| r.quantity), Some(1));
                assert_eq!(state.movements.len(), 1);
                assert_eq!(state.movements[0].kind, MovementKind::Reserve);
                assert_eq!(state.revision(), 1);
                assert!(matches!(state.last_outcome, Some(Ok(_))));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn rejected_command_leaves_collections_untouched() {
        let before = state();
        let expected_parts = before.parts.clone();
        ReducerTest::new(LedgerReducer::new())
            .with_env(stored_env())
            .given_state(before)
            .given_actions([LedgerAction::SwitchRole {
                role: Role::Cleaning,
            }])
            .when_action(LedgerAction::AdjustStock {
                part_id: PartId::from("P-001"),
                delta: 5,
                note: None,
            })
            .then_state(move |state| {
                assert_eq!(state.parts, expected_parts);
                assert!(state.movements.is_empty());
                assert!(matches!(
                    state.last_outcome,
                    Some(Err(LedgerError::PermissionDenied { .. }))
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn accepted_command_saves_touched_collections() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(stored_env())
            .given_state(state())
            .when_action(LedgerAction::AdjustStock {
                part_id: PartId::from("P-001"),
                delta: 4,
                note: Some("Cycle count".to_string()),
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_storage_effect(effects);
                let keys = format!("{:?}", effects[0]);
                assert!(keys.contains("hotel_ops_parts"));
                assert!(keys.contains("hotel_ops_movements"));
                assert!(!keys.contains("hotel_ops_tickets"));
            })
            .run();
    }

    #[test]
    fn role_switch_is_not_persisted() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(stored_env())
            .given_state(state())
            .when_action(LedgerAction::SwitchRole {
                role: Role::Maintenance,
            })
            .then_state(|state| assert_eq!(state.role, Role::Maintenance))
            .then_effects(assertions::assert_no_storage_effect)
            .run();
    }

    #[test]
    fn receipt_with_delay_schedules_confirmation() {
        let config = LedgerConfig::default().with_po_receipt_delay(StdDuration::from_millis(400));
        let env = LedgerEnvironment::new(Arc::new(test_clock()), config);

        ReducerTest::new(LedgerReducer::new())
            .with_env(env)
            .given_state(state())
            .given_actions([LedgerAction::CreatePurchaseOrder {
                request: PurchaseOrderRequest::new("P-001", 10),
            }])
            .when_action(LedgerAction::ReceivePurchaseOrder {
                po_id: PurchaseOrderId::new(1),
            })
            .then_state(|state| {
                assert_eq!(part(state, "P-001").on_hand, 1);
                assert!(state.last_outcome.is_none());
            })
            .then_effects(assertions::assert_has_delay_effect)
            .run();
    }

    #[test]
    fn unknown_ticket_update_is_a_no_op() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(stored_env())
            .given_state(state())
            .when_action(LedgerAction::UpdateTicket {
                ticket_id: TicketId::new(1),
                patch: TicketPatch::new().status(TicketStatus::Resolved),
                description: "Resolved".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.revision(), 0);
                assert!(matches!(state.last_outcome, Some(Ok(_))));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn persistence_failure_is_recorded_without_rollback() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(state())
            .given_actions([LedgerAction::RegisterInspection {
                room_number: "204".to_string(),
            }])
            .when_action(LedgerAction::PersistenceFailed {
                error: "disk full".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.last_persistence_error.as_deref(), Some("disk full"));
                assert!(state.inspections.contains_key("204"));
            })
            .run();
    }

    #[test]
    fn reset_restores_seed_and_management_role() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(state())
            .given_actions([
                LedgerAction::AdjustStock {
                    part_id: PartId::from("P-099"),
                    delta: -10,
                    note: None,
                },
                LedgerAction::SwitchRole {
                    role: Role::Reception,
                },
            ])
            .when_action(LedgerAction::ResetDemoData)
            .then_state(|state| {
                assert_eq!(state.role, Role::Management);
                assert_eq!(part(state, "P-099").on_hand, 10);
                assert!(state.movements.is_empty());
                assert_eq!(state.revision(), 3);
            })
            .run();
    }

    #[test]
    fn delta_is_floored_at_zero() {
        assert_eq!(apply_delta(5, -100), 0);
        assert_eq!(apply_delta(5, 3), 8);
        assert_eq!(apply_delta(u32::MAX, 1), u32::MAX);
        assert_eq!(clamp_quantity(-3), 1);
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(7), 7);
    }
}
