//! Integration tests for tickets, cannibalization, inspections and logbooks

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use hotel_ops_core::environment::Clock;
use hotel_ops_ledger::logbook::ReadingStatus;
use hotel_ops_ledger::priority::priority_score;
use hotel_ops_ledger::{
    Impact, InspectionFinding, Ledger, LedgerConfig, LedgerEnvironment, LedgerError, LedgerState,
    LogbookKind, MaintenanceType, NewLogbookEntry, NewTicket, PartId, Role, TicketId,
    TicketOrigin, TicketPatch, TicketStatus, Urgency,
};
use hotel_ops_testing::test_clock;
use std::sync::Arc;

fn environment() -> LedgerEnvironment {
    LedgerEnvironment::new(Arc::new(test_clock()), LedgerConfig::default())
}

fn empty_ledger() -> Ledger {
    Ledger::new(LedgerState::default(), environment())
}

fn demo_ledger() -> Ledger {
    Ledger::seeded(environment())
}

fn outlet_ticket() -> NewTicket {
    NewTicket::new(
        "305",
        "Electrical",
        "Not working / Won't turn on",
        "Bedside outlet has no power.",
    )
}

#[test]
fn first_ticket_on_empty_ledger() {
    let mut ledger = empty_ledger();
    ledger.switch_role(Role::Reception).unwrap();

    let receipt = ledger
        .add_ticket(outlet_ticket().occupied(true).severity(Urgency::High, Impact::Annoying))
        .unwrap();
    assert_eq!(receipt.ticket_id, Some(TicketId::new(1001)));

    let ticket = &ledger.tickets()[0];
    assert_eq!(ticket.id.to_string(), "T-1001");
    assert_eq!(ticket.status, TicketStatus::Reported);
    assert_eq!(ticket.origin, TicketOrigin::Guest);
    assert_eq!(ticket.created_by, Role::Reception);
    assert_eq!(ticket.maintenance_type, MaintenanceType::Electrician);
    assert_eq!(ticket.created_at, test_clock().now());
    assert_eq!(ticket.history.len(), 1);
    assert_eq!(ticket.history[0].actor, Role::Reception.to_string());
    assert_eq!(
        ticket.priority_score(),
        priority_score(Urgency::High, Impact::Annoying, true, TicketStatus::Reported)
    );

    let second = ledger.add_ticket(outlet_ticket()).unwrap();
    assert_eq!(second.ticket_id, Some(TicketId::new(1002)));
    assert_eq!(ledger.tickets()[0].id, TicketId::new(1002));
}

#[test]
fn empty_room_is_rejected() {
    let mut ledger = empty_ledger();
    let error = ledger
        .add_ticket(NewTicket::new("  ", "Plumbing", "Clogged / Blocked", ""))
        .unwrap_err();
    assert!(matches!(error, LedgerError::InvalidInput(_)));
    assert!(ledger.tickets().is_empty());
    assert_eq!(ledger.revision(), 0);
}

#[test]
fn update_rescores_and_records_history() {
    let mut ledger = demo_ledger();
    let id = TicketId::new(8003);
    let before = ledger.ticket(id).unwrap().priority_score();

    let patch = TicketPatch::new()
        .urgency(Urgency::High)
        .impact(Impact::Blocking)
        .note("Water reaching the hallway");
    ledger.update_ticket(id, patch, "Escalated by front desk").unwrap();

    let ticket = ledger.ticket(id).unwrap();
    assert!(ticket.priority_score() > before);
    assert_eq!(
        ticket.priority_score(),
        priority_score(Urgency::High, Impact::Blocking, true, TicketStatus::Reported)
    );
    assert_eq!(ticket.notes.last().unwrap(), "Water reaching the hallway");
    assert_eq!(ticket.history.last().unwrap().action, "Escalated by front desk");
}

#[test]
fn update_of_unknown_ticket_changes_nothing() {
    let mut ledger = demo_ledger();
    let tickets = ledger.tickets().to_vec();
    ledger
        .update_ticket(TicketId::new(9999), TicketPatch::new().status(TicketStatus::Resolved), "x")
        .unwrap();
    assert_eq!(ledger.tickets(), tickets.as_slice());
    assert_eq!(ledger.revision(), 0);
}

#[test]
fn cannibalization_files_exactly_one_donor_ticket() {
    let mut ledger = demo_ledger();
    let recipient = TicketId::new(8001);
    let count = ledger.tickets().len();
    let notes = ledger.ticket(recipient).unwrap().notes.len();

    let receipt = ledger
        .cannibalize_part(recipient, "108", "A/C Remote Control")
        .unwrap();
    let donor_id = receipt.ticket_id.unwrap();

    assert_eq!(ledger.tickets().len(), count + 1);
    let donor = ledger.ticket(donor_id).unwrap();
    assert_eq!(donor.room_number, "108");
    assert_eq!(donor.status, TicketStatus::WaitingPart);
    assert_eq!((donor.urgency, donor.impact), (Urgency::High, Impact::Blocking));
    assert_eq!(donor.origin, TicketOrigin::System);
    assert_eq!(donor.created_by, Role::Maintenance);
    assert_eq!(donor.maintenance_type, MaintenanceType::HvacTechnician);
    assert!(donor.needs_part);
    assert_eq!(donor.part_name.as_deref(), Some("A/C Remote Control"));
    assert!(donor.reservation().is_none());
    assert_eq!(
        donor.history[0].action,
        "Automatic ticket from cannibalization for room 106"
    );

    let recipient = ledger.ticket(recipient).unwrap();
    assert_eq!(recipient.notes.len(), notes + 1);
    assert_eq!(recipient.notes.last().unwrap(), "Part taken from room 108");
    assert_eq!(recipient.cannibalized_from_room.as_deref(), Some("108"));
}

#[test]
fn cannibalization_needs_known_recipient() {
    let mut ledger = demo_ledger();
    let count = ledger.tickets().len();
    let error = ledger
        .cannibalize_part(TicketId::new(4242), "108", "Remote")
        .unwrap_err();
    assert!(matches!(error, LedgerError::NotFound { .. }));

    let error = ledger
        .cannibalize_part(TicketId::new(8001), "", "Remote")
        .unwrap_err();
    assert!(matches!(error, LedgerError::InvalidInput(_)));
    assert_eq!(ledger.tickets().len(), count);
}

#[test]
fn ticket_lifecycle_through_vendor() {
    let mut ledger = demo_ledger();
    let id = TicketId::new(2001);

    ledger.assign_ticket(id, "Carlos M.").unwrap();
    assert_eq!(ledger.ticket(id).unwrap().status, TicketStatus::InProgress);

    ledger.escalate_to_vendor(id, "Electrician").unwrap();
    let ticket = ledger.ticket(id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Vendor);
    assert!(ticket.needs_vendor);
    assert_eq!(ticket.vendor_type.as_deref(), Some("Electrician"));

    ledger
        .resolve_ticket(id, 45, Some("evidence/2001.jpg".to_string()))
        .unwrap();
    ledger.verify_ticket(id, "Night Manager").unwrap();

    let ticket = ledger.ticket(id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Verified);
    assert_eq!(
        ticket.priority_score(),
        priority_score(ticket.urgency, ticket.impact, ticket.is_occupied, ticket.status)
    );
    assert_eq!(ticket.verified_by.as_deref(), Some("Night Manager"));
    assert_eq!(ticket.evidence_url.as_deref(), Some("evidence/2001.jpg"));
    assert_eq!(
        ticket.history.iter().map(|h| h.action.as_str()).collect::<Vec<_>>()[1..],
        [
            "Assigned to Carlos M.",
            "Escalated to vendor: Electrician",
            "Resolved in 45 min.",
            "Verified by Night Manager",
        ]
    );
}

#[test]
fn inspection_with_part_files_waiting_ticket() {
    let mut ledger = demo_ledger();
    ledger.switch_role(Role::Supervisor).unwrap();

    let finding = InspectionFinding::new("Electrical", "Not working / Won't turn on")
        .urgency(Urgency::High)
        .needing_part("P-006");
    let receipt = ledger.submit_inspection("415", finding).unwrap();

    let ticket = ledger.ticket(receipt.ticket_id.unwrap()).unwrap();
    assert_eq!(ticket.room_number, "415");
    assert!(!ticket.is_occupied);
    assert_eq!(ticket.impact, Impact::Annoying);
    assert_eq!(ticket.urgency, Urgency::High);
    assert_eq!(ticket.created_by, Role::Supervisor);
    assert_eq!(ticket.status, TicketStatus::WaitingPart);
    assert_eq!(ticket.part_id, Some(PartId::from("P-006")));
    assert_eq!(ticket.part_qty, Some(1));
    assert_eq!(ticket.notes, vec!["Requires part: Warm LED Bulb 9W".to_string()]);
    assert_eq!(
        ticket.description,
        "Inspection report: Not working / Won't turn on on Electrical"
    );
    assert_eq!(ledger.inspections().get("415"), Some(&test_clock().now()));
}

#[test]
fn inspection_without_part_and_with_unknown_part() {
    let mut ledger = demo_ledger();
    ledger.switch_role(Role::Supervisor).unwrap();

    let receipt = ledger
        .submit_inspection(
            "416",
            InspectionFinding::new("Furniture", "Broken / Damaged").description("Loose drawer"),
        )
        .unwrap();
    let ticket = ledger.ticket(receipt.ticket_id.unwrap()).unwrap();
    assert_eq!(ticket.status, TicketStatus::Reported);
    assert_eq!(ticket.description, "Loose drawer");
    assert_eq!(ticket.notes, vec!["Filed from supervisor inspection".to_string()]);

    let count = ledger.tickets().len();
    let error = ledger
        .submit_inspection("417", InspectionFinding::new("Other", "Other").needing_part("P-777"))
        .unwrap_err();
    assert!(matches!(error, LedgerError::NotFound { .. }));
    assert_eq!(ledger.tickets().len(), count);
    assert!(!ledger.inspections().contains_key("417"));
}

#[test]
fn register_inspection_overwrites_timestamp() {
    let clock = test_clock();
    let mut ledger = Ledger::seeded(LedgerEnvironment::new(
        Arc::new(clock.clone()),
        LedgerConfig::default(),
    ));
    ledger.register_inspection("301").unwrap();
    assert_eq!(ledger.inspections().get("301"), Some(&clock.now()));

    let later = clock.advanced_by(chrono::Duration::hours(3));
    let mut ledger = Ledger::new(
        ledger.state().clone(),
        LedgerEnvironment::new(Arc::new(later.clone()), LedgerConfig::default()),
    );
    ledger.register_inspection("301").unwrap();
    assert_eq!(ledger.inspections().get("301"), Some(&later.now()));
    assert_eq!(ledger.inspections().len(), 1);
}

#[test]
fn logbook_entries_get_status_and_ids() {
    let mut ledger = demo_ledger();
    ledger.switch_role(Role::Maintenance).unwrap();

    ledger
        .add_logbook_entry(
            NewLogbookEntry::new(LogbookKind::Pool)
                .reading("chlorine", 1.5)
                .reading("ph", 7.4),
        )
        .unwrap();
    ledger
        .add_logbook_entry(NewLogbookEntry::new(LogbookKind::Boilers).reading("pressure", 9.0))
        .unwrap();

    let entries = ledger.logbook();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id.to_string(), "LOG-2");
    assert_eq!(entries[0].status, ReadingStatus::Critical);
    assert_eq!(entries[1].id.to_string(), "LOG-1");
    assert_eq!(entries[1].status, ReadingStatus::Ok);
    assert_eq!(entries[1].recorded_by, Role::Maintenance);

    let error = ledger
        .add_logbook_entry(
            NewLogbookEntry::new(LogbookKind::Energy).reading("line_voltage", f64::NAN),
        )
        .unwrap_err();
    assert!(matches!(error, LedgerError::InvalidInput(_)));
    assert_eq!(ledger.logbook().len(), 2);
}

#[test]
fn dashboard_and_export_reflect_tickets() {
    let mut ledger = demo_ledger();
    let board = ledger.dashboard();
    assert_eq!(board.pending, 33);
    assert_eq!(board.blocked, 2);
    assert_eq!(board.top_priority.len(), 5);
    assert!(board.top_priority.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(board.tickets_per_asset.values().sum::<usize>(), 33);

    ledger.resolve_ticket(TicketId::new(8003), 10, None).unwrap();
    ledger.verify_ticket(TicketId::new(8003), "Night Manager").unwrap();
    let board = ledger.dashboard();
    assert_eq!(board.pending, 32);
    assert_eq!(board.verified_last_week, 1);

    let csv = ledger.export_csv();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("ID,Room,Status,Description"));
    assert_eq!(lines.count(), 33);
    assert!(csv.contains("T-8003,101,Verified,Slight shower leak found during cleaning."));
}

#[test]
fn reset_restores_seed_and_role() {
    let mut ledger = demo_ledger();
    ledger.switch_role(Role::Reception).unwrap();
    ledger.add_ticket(outlet_ticket()).unwrap();
    ledger.register_inspection("305").unwrap();

    ledger.reset_demo_data().unwrap();
    assert_eq!(ledger.role(), Role::Management);
    assert_eq!(ledger.tickets().len(), 33);
    assert!(ledger.inspections().is_empty());
    assert!(ledger.movements().is_empty());

    let receipt = ledger.add_ticket(outlet_ticket()).unwrap();
    assert_eq!(receipt.ticket_id, Some(TicketId::new(8004)));
}
