//! Integration tests for reservations, stock adjustments and purchase orders
//!
//! Each test drives a [`Ledger`] through the public API, the same way the demo
//! binary does, against the bundled demo dataset and a fixed clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use hotel_ops_core::environment::Clock;
use hotel_ops_ledger::{
    InventoryPart, Ledger, LedgerConfig, LedgerEnvironment, LedgerError, LedgerState,
    MovementKind, PartId, PurchaseOrderId, PurchaseOrderRequest, PurchaseOrderStatus, Role,
    TicketId, TicketPatch, TicketStatus,
};
use hotel_ops_testing::test_clock;
use std::sync::Arc;

fn environment() -> LedgerEnvironment {
    LedgerEnvironment::new(Arc::new(test_clock()), LedgerConfig::default())
}

fn demo_ledger() -> Ledger {
    Ledger::seeded(environment())
}

fn part<'a>(ledger: &'a Ledger, id: &str) -> &'a InventoryPart {
    ledger.part(&PartId::from(id)).expect("part exists")
}

#[test]
fn last_unit_can_only_be_reserved_once() {
    let mut ledger = demo_ledger();
    let first = TicketId::new(8003);
    let second = TicketId::new(2001);

    let before = part(&ledger, "P-001").clone();
    assert_eq!((before.on_hand, before.reserved, before.min_stock), (1, 0, 10));

    let receipt = ledger.reserve_part_for_ticket(first, "P-001", 1).unwrap();
    assert_eq!(receipt.ticket_id, Some(first));
    assert_eq!(part(&ledger, "P-001").available(), 0);

    let ticket = ledger.ticket(first).unwrap();
    assert_eq!(ticket.status, TicketStatus::WaitingPart);
    assert!(ticket.needs_part);
    assert_eq!(ticket.part_id, Some(PartId::from("P-001")));
    assert_eq!(ticket.part_qty, Some(1));

    let error = ledger.reserve_part_for_ticket(second, "P-001", 1).unwrap_err();
    assert_eq!(
        error,
        LedgerError::InsufficientStock {
            part_id: PartId::from("P-001"),
            requested: 1,
            available: 0,
        }
    );
    assert_eq!(part(&ledger, "P-001").reserved, 1);
    assert!(!ledger.ticket(second).unwrap().needs_part);
}

#[test]
fn purchase_order_receipt_adds_ordered_quantity_once() {
    let mut ledger = demo_ledger();
    let on_hand = part(&ledger, "P-001").on_hand;

    let receipt = ledger
        .create_po_for_part(PurchaseOrderRequest::new("P-001", 10))
        .unwrap();
    let po_id = receipt.po_id.unwrap();
    let order = &ledger.purchase_orders()[0];
    assert_eq!(order.id, po_id);
    assert_eq!(order.status, PurchaseOrderStatus::Ordered);
    assert_eq!(order.vendor, "Local Hardware");
    assert_eq!(order.total_quantity(), 10);
    assert_eq!(order.eta, Some(test_clock().now() + chrono::Duration::days(2)));

    ledger.receive_po(po_id).unwrap();
    assert_eq!(part(&ledger, "P-001").on_hand, on_hand + 10);
    assert_eq!(ledger.purchase_orders()[0].status, PurchaseOrderStatus::Received);

    let error = ledger.receive_po(po_id).unwrap_err();
    assert_eq!(error, LedgerError::AlreadyFinalized(po_id));
    assert_eq!(part(&ledger, "P-001").on_hand, on_hand + 10);

    let kinds: Vec<MovementKind> = ledger.movements().iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![MovementKind::PoCreated, MovementKind::Receive, MovementKind::PoReceived]
    );
}

#[test]
fn purchase_order_links_ticket_and_uses_overrides() {
    let mut ledger = demo_ledger();
    let ticket_id = TicketId::new(8001);

    let request = PurchaseOrderRequest::new("P-004", 0)
        .vendor("Rapid HVAC")
        .eta_days(7)
        .for_ticket(ticket_id);
    let po_id = ledger.create_po_for_part(request).unwrap().po_id.unwrap();

    let order = ledger.purchase_orders().iter().find(|po| po.id == po_id).unwrap();
    assert_eq!(order.vendor, "Rapid HVAC");
    assert_eq!(order.lines[0].quantity, 1);
    assert_eq!(order.eta, Some(test_clock().now() + chrono::Duration::days(7)));

    let ticket = ledger.ticket(ticket_id).unwrap();
    assert_eq!(ticket.po_id, Some(po_id));
    assert_eq!(ticket.history.last().unwrap().action, format!("PO linked: {po_id}"));
    assert_eq!(ledger.movements()[0].ticket_id, Some(ticket_id));
}

#[test]
fn unknown_purchase_order_is_not_found() {
    let mut ledger = demo_ledger();
    let error = ledger.receive_po(PurchaseOrderId::new(42)).unwrap_err();
    assert!(matches!(error, LedgerError::NotFound { .. }));
}

#[test]
fn large_removal_clamps_on_hand_to_zero() {
    let bin = InventoryPart::new("P-500", "Shower Head", "Plumbing", "pc", 5, 2);
    let state = LedgerState::from_collections(Vec::new(), vec![bin], Vec::new());
    let mut ledger = Ledger::new(state, environment());

    ledger
        .adjust_stock("P-500", -100, Some("Water damage".to_string()))
        .unwrap();
    assert_eq!(part(&ledger, "P-500").on_hand, 0);

    let movement = &ledger.movements()[0];
    assert_eq!(movement.kind, MovementKind::Adjust);
    assert_eq!(movement.quantity, 100);
    assert_eq!(movement.note.as_deref(), Some("Water damage"));
}

#[test]
fn adjustment_below_reserved_is_reported_not_rejected() {
    let mut ledger = demo_ledger();
    ledger.adjust_stock("P-003", 2, None).unwrap();
    ledger
        .reserve_part_for_ticket(TicketId::new(2003), "P-003", 5)
        .unwrap();
    ledger.adjust_stock("P-003", -4, None).unwrap();

    let part = part(&ledger, "P-003");
    assert_eq!((part.on_hand, part.reserved), (2, 5));
    assert!(
        ledger
            .stock_invariant_violations()
            .iter()
            .any(|v| v.part_id == PartId::from("P-003"))
    );
}

#[test]
fn release_restores_reserved_count() {
    let mut ledger = demo_ledger();
    let ticket_id = TicketId::new(8003);
    let reserved = part(&ledger, "P-099").reserved;

    ledger.reserve_part_for_ticket(ticket_id, "P-099", 3).unwrap();
    assert_eq!(part(&ledger, "P-099").reserved, reserved + 3);

    ledger.release_reservation_for_ticket(ticket_id, None).unwrap();
    assert_eq!(part(&ledger, "P-099").reserved, reserved);
    assert!(ledger.ticket(ticket_id).unwrap().reservation().is_none());

    let release = ledger.movements().last().unwrap();
    assert_eq!(release.kind, MovementKind::Release);
    assert_eq!(release.note.as_deref(), Some("Released"));

    let error = ledger.release_reservation_for_ticket(ticket_id, None).unwrap_err();
    assert!(matches!(error, LedgerError::NotFound { .. }));
}

#[test]
fn re_reserving_releases_the_previous_hold() {
    let mut ledger = demo_ledger();
    let ticket_id = TicketId::new(8003);

    ledger.reserve_part_for_ticket(ticket_id, "P-099", 2).unwrap();
    ledger.reserve_part_for_ticket(ticket_id, "P-003", 1).unwrap();

    assert_eq!(part(&ledger, "P-099").reserved, 0);
    assert_eq!(part(&ledger, "P-003").reserved, 1);
    let kinds: Vec<MovementKind> = ledger.movements().iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![MovementKind::Reserve, MovementKind::Release, MovementKind::Reserve]
    );
}

#[test]
fn reserved_ticket_part_fields_cannot_be_patched() {
    let mut ledger = demo_ledger();
    let held = TicketId::new(8003);
    let other = TicketId::new(2003);
    let baseline = part(&ledger, "P-099").reserved;

    ledger.reserve_part_for_ticket(held, "P-099", 4).unwrap();
    ledger.reserve_part_for_ticket(other, "P-099", 1).unwrap();

    let shrink = TicketPatch {
        part_qty: Some(1),
        ..TicketPatch::default()
    };
    let error = ledger.update_ticket(held, shrink, "Quantity edited").unwrap_err();
    assert!(matches!(error, LedgerError::InvalidInput(_)));
    assert_eq!(ledger.ticket(held).unwrap().part_qty, Some(4));

    let unlink = TicketPatch {
        needs_part: Some(false),
        ..TicketPatch::default()
    };
    assert!(ledger.update_ticket(held, unlink, "Unlinked").is_err());

    // Non-stock fields stay editable while the hold is active
    ledger
        .update_ticket(held, TicketPatch::new().assigned_to("Carlos M."), "Assigned")
        .unwrap();

    ledger.release_reservation_for_ticket(held, None).unwrap();
    assert_eq!(part(&ledger, "P-099").reserved, baseline + 1);
    ledger.release_reservation_for_ticket(other, None).unwrap();
    assert_eq!(part(&ledger, "P-099").reserved, baseline);
}

#[test]
fn out_of_range_eta_is_rejected() {
    let mut ledger = demo_ledger();
    let error = ledger
        .create_po_for_part(PurchaseOrderRequest::new("P-001", 1).eta_days(u32::MAX))
        .unwrap_err();
    assert!(matches!(error, LedgerError::InvalidInput(_)));
    assert!(ledger.purchase_orders().is_empty());
    assert!(ledger.movements().is_empty());

    // The next accepted order still takes the first id
    let po_id = ledger
        .create_po_for_part(PurchaseOrderRequest::new("P-001", 1).eta_days(3650))
        .unwrap()
        .po_id
        .unwrap();
    assert_eq!(ledger.purchase_orders()[0].id, po_id);
}

#[test]
fn issue_consumes_reserved_and_on_hand_equally() {
    let mut ledger = demo_ledger();
    let ticket_id = TicketId::new(8003);
    ledger.reserve_part_for_ticket(ticket_id, "P-099", 4).unwrap();
    let before = part(&ledger, "P-099").clone();

    ledger
        .issue_reserved_part_for_ticket(ticket_id, Some("Insulated wiring".to_string()))
        .unwrap();

    let after = part(&ledger, "P-099");
    assert_eq!(before.on_hand - after.on_hand, 4);
    assert_eq!(before.reserved - after.reserved, 4);
    let ticket = ledger.ticket(ticket_id).unwrap();
    assert!(!ticket.needs_part);
    assert_eq!(
        ticket.history.last().unwrap().action,
        "Part used: Black Insulating Tape (x4)"
    );
}

#[test]
fn roles_without_capability_are_rejected() {
    let mut ledger = demo_ledger();
    let ticket_id = TicketId::new(8003);

    ledger.switch_role(Role::Maintenance).unwrap();
    assert!(ledger.permissions().can_reserve);
    assert!(!ledger.permissions().can_create_po);
    let error = ledger
        .create_po_for_part(PurchaseOrderRequest::new("P-001", 1))
        .unwrap_err();
    assert!(matches!(error, LedgerError::PermissionDenied { role: Role::Maintenance, .. }));
    assert!(ledger.purchase_orders().is_empty());

    ledger.switch_role(Role::Cleaning).unwrap();
    let error = ledger.reserve_part_for_ticket(ticket_id, "P-099", 1).unwrap_err();
    assert!(matches!(error, LedgerError::PermissionDenied { role: Role::Cleaning, .. }));
    assert!(ledger.movements().is_empty());
}

#[test]
fn zero_adjustment_is_invalid() {
    let mut ledger = demo_ledger();
    let error = ledger.adjust_stock("P-001", 0, None).unwrap_err();
    assert!(matches!(error, LedgerError::InvalidInput(_)));
}

#[test]
fn shopping_list_counts_waiting_tickets() {
    let ledger = demo_ledger();
    let list = ledger.shopping_list();

    let bulbs = list
        .iter()
        .find(|s| s.part_id == PartId::from("P-006"))
        .unwrap();
    assert_eq!(bulbs.awaited, 2);
    assert_eq!(bulbs.waiting_tickets, vec![TicketId::new(8002)]);
    assert!(bulbs.suggested_quantity >= 2);
    assert!(list.iter().all(|s| s.part_id != PartId::from("P-099")));
}
