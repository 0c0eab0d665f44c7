//! Bundled demo dataset.
//!
//! Used on first start, after a reset, and whenever a persisted collection is
//! missing or unreadable.

use crate::state::LedgerState;
use crate::types::{
    AuditEntry, Impact, InventoryPart, NewTicket, PartId, PurchaseOrder, Role, Ticket, TicketId,
    TicketOrigin, TicketStatus, Urgency,
};
use chrono::{DateTime, Duration, Utc};

const GENERATED_TICKETS: u32 = 30;

struct Incident {
    asset: &'static str,
    issue: &'static str,
    description: &'static str,
}

const INCIDENTS: [Incident; 5] = [
    Incident {
        asset: "Air Conditioning",
        issue: "Not working / Won't turn on",
        description: "BMS sensor: temperature stays at 26°C after one hour of operation.",
    },
    Incident {
        asset: "Plumbing",
        issue: "Clogged / Blocked",
        description: "Housekeeping reports: sink drains very slowly, possible partial clog.",
    },
    Incident {
        asset: "Electrical",
        issue: "Not working / Won't turn on",
        description: "Guest reports: nightstand outlet has no power to charge a phone.",
    },
    Incident {
        asset: "Locks",
        issue: "Low / Dead battery",
        description: "Automatic alert: main door lock battery at 15%.",
    },
    Incident {
        asset: "TV/WiFi",
        issue: "No signal / Unprogrammed",
        description: "Guest reports: TV shows a blue 'No Signal' screen on sports channels.",
    },
];

/// Parts catalogue
#[must_use]
pub fn parts() -> Vec<InventoryPart> {
    let mut remote = InventoryPart::new("P-004", "Universal A/C Remote Control", "HVAC", "pc", 0, 5)
        .supplied_by("Southern Climate Supply", 3)
        .stored_at("Storeroom H-3", "HVAC-RMT-UNI");
    remote.reserved = 1;

    let mut bulb = InventoryPart::new("P-006", "Warm LED Bulb 9W", "Electrical", "pc", 0, 10)
        .supplied_by("Ilumina2", 1)
        .stored_at("Storeroom E-1", "ELE-LED-9W");
    bulb.reserved = 2;

    vec![
        InventoryPart::new("P-001", "Universal Premium Outlet (White)", "Electrical", "pc", 1, 10)
            .supplied_by("Local Hardware", 2)
            .stored_at("Storeroom E-2", "ELE-OUT-UNI-WHT"),
        InventoryPart::new("P-002", "Universal Sink Gasket Kit", "Plumbing", "kit", 2, 15)
            .supplied_by("Plumbing Express", 1)
            .stored_at("Storeroom P-1", "PLO-EMP-KIT"),
        remote,
        InventoryPart::new("P-009", "4K HDMI Cable (2m)", "TV/WiFi", "pc", 0, 5)
            .supplied_by("TechSolutions", 2)
            .stored_at("Cabinet T-1", "TV-HDMI-2M"),
        InventoryPart::new("P-003", "Industrial AA Alkaline Batteries", "Locks", "pack", 4, 20)
            .supplied_by("Battery Wholesale", 1)
            .stored_at("Front Desk", "CER-BAT-AA"),
        InventoryPart::new("P-008", "Wood Epoxy Glue", "Furniture", "tube", 0, 3)
            .supplied_by("Fine Woods", 2)
            .stored_at("Workshop", "MOB-EPO-WOD"),
        InventoryPart::new("P-011", "Matte White Paint (Gallon)", "Other", "gal", 1, 4)
            .supplied_by("Pro Paints", 1)
            .stored_at("Storeroom Q-1", "OTR-PNT-WHT"),
        bulb,
        InventoryPart::new("P-099", "Black Insulating Tape", "Consumables", "roll", 10, 2)
            .supplied_by("Local Hardware", 0)
            .stored_at("Tool Box", "CON-TAPE-BLK"),
    ]
}

/// Purchase orders (none)
#[must_use]
pub const fn purchase_orders() -> Vec<PurchaseOrder> {
    Vec::new()
}

/// Base tickets followed by the generated incident tickets
#[must_use]
pub fn tickets(now: DateTime<Utc>) -> Vec<Ticket> {
    let mut tickets = base_tickets(now);
    tickets.extend((0..GENERATED_TICKETS).map(|i| generated_ticket(i, now)));
    tickets
}

/// Seeded ledger state as of `now`
#[must_use]
pub fn demo_state(now: DateTime<Utc>) -> LedgerState {
    LedgerState::from_collections(tickets(now), parts(), purchase_orders())
}

fn base_tickets(now: DateTime<Utc>) -> Vec<Ticket> {
    let days_ago = |days| now - Duration::days(days);

    vec![
        Ticket::create(
            TicketId::new(8001),
            NewTicket::new(
                "106",
                "Air Conditioning",
                "Missing / Lost",
                "Remote control missing from the room. Guest needs one urgently.",
            )
            .occupied(true)
            .severity(Urgency::High, Impact::Blocking)
            .with_status(TicketStatus::WaitingPart)
            .needing_part(PartId::from("P-004"), "Universal A/C Remote Control", 1),
            days_ago(1),
            Role::Reception,
        ),
        Ticket::create(
            TicketId::new(8002),
            NewTicket::new(
                "202",
                "Electrical",
                "Not working / Won't turn on",
                "Main suite bulbs burnt out.",
            )
            .with_status(TicketStatus::WaitingPart)
            .needing_part(PartId::from("P-006"), "Warm LED Bulb 9W", 2),
            days_ago(2),
            Role::Maintenance,
        ),
        Ticket::create(
            TicketId::new(8003),
            NewTicket::new(
                "101",
                "Plumbing",
                "Dripping / Water leak",
                "Slight shower leak found during cleaning.",
            )
            .occupied(true)
            .severity(Urgency::Low, Impact::Annoying),
            now,
            Role::Cleaning,
        ),
    ]
}

fn generated_ticket(i: u32, now: DateTime<Utc>) -> Ticket {
    let incident = &INCIDENTS[(i as usize) % INCIDENTS.len()];
    let even = i % 2 == 0;
    let system = i % 3 == 0;

    let data = NewTicket::new(
        (201 + i).to_string(),
        incident.asset,
        incident.issue,
        incident.description,
    )
    .occupied(even)
    .severity(
        if system { Urgency::High } else { Urgency::Medium },
        if even { Impact::Blocking } else { Impact::Annoying },
    )
    .with_origin(if system { TicketOrigin::System } else { TicketOrigin::Guest })
    .with_note("Simulation: ticket generated by an operational event.");
    let creator = if system { Role::Management } else { Role::Reception };

    let mut ticket = Ticket::create(TicketId::new(2000 + i), data, now, creator);
    ticket.history = vec![AuditEntry::new(now, "Ticket registered in system", "System")];
    ticket
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::stock_invariant_violations;

    #[test]
    fn seed_sizes() {
        let now = Utc::now();
        assert_eq!(tickets(now).len(), 33);
        assert_eq!(parts().len(), 9);
        assert!(purchase_orders().is_empty());
    }

    #[test]
    fn seeded_reservations_match_waiting_tickets() {
        let now = Utc::now();
        let tickets = tickets(now);
        let parts = parts();
        for part in &parts {
            let held: u32 = tickets
                .iter()
                .filter_map(Ticket::reservation)
                .filter(|r| r.part_id == part.id)
                .map(|r| r.quantity)
                .sum();
            assert_eq!(held, part.reserved, "{}", part.id);
        }
    }

    #[test]
    fn seed_contains_over_reserved_parts() {
        let report = stock_invariant_violations(&parts());
        let ids: Vec<&str> = report.iter().map(|v| v.part_id.as_str()).collect();
        assert_eq!(ids, vec!["P-004", "P-006"]);
    }

    #[test]
    fn generated_tickets_alternate_severity() {
        let now = Utc::now();
        let first = generated_ticket(0, now);
        assert_eq!(first.id, TicketId::new(2000));
        assert_eq!(first.room_number, "201");
        assert!(first.is_occupied);
        assert_eq!(first.origin, TicketOrigin::System);
        assert_eq!(first.created_by, Role::Management);
        assert_eq!(first.history[0].actor, "System");

        let second = generated_ticket(1, now);
        assert_eq!(second.urgency, Urgency::Medium);
        assert_eq!(second.impact, Impact::Annoying);
        assert_eq!(second.origin, TicketOrigin::Guest);
    }

    #[test]
    fn demo_state_continues_ticket_sequence() {
        let mut state = demo_state(Utc::now());
        assert_eq!(state.sequences.next_ticket(), TicketId::new(8004));
    }
}
