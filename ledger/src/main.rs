//! Scripted walk through the hotel operations ledger.
//!
//! # Usage
//!
//! In memory, starting from the demo dataset:
//! ```bash
//! cargo run --bin hotel-ops-demo
//! ```
//!
//! Persisting every collection as JSON files under a directory:
//! ```bash
//! HOTEL_OPS_DATA_DIR=./data RUST_LOG=hotel_ops_ledger=debug \
//!   cargo run --bin hotel-ops-demo
//! ```
//!
//! Settings are read from the environment and from a `.env` file; see
//! [`LedgerConfig::from_env`].

use hotel_ops_core::environment::SystemClock;
use hotel_ops_ledger::{
    Impact, InspectionFinding, JsonDirectoryStore, Ledger, LedgerConfig, LedgerEnvironment,
    LogbookKind, NewLogbookEntry, NewTicket, PurchaseOrderRequest, Role, Urgency,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hotel_ops_ledger=info,hotel_ops_demo=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Hotel Operations Ledger ===");

    let config = LedgerConfig::from_env();
    config.validate()?;

    let mut environment = LedgerEnvironment::new(Arc::new(SystemClock), config.clone());
    if let Some(dir) = &config.data_dir {
        info!(dir = %dir.display(), "persisting collections as JSON documents");
        environment = environment.with_storage(Arc::new(JsonDirectoryStore::open(dir)?));
    }
    let mut ledger = Ledger::open(environment);

    let board = ledger.dashboard();
    info!(
        pending = board.pending,
        critical = board.critical,
        blocked = board.blocked,
        "dashboard"
    );
    for entry in &board.top_priority {
        info!(
            ticket = %entry.ticket_id,
            room = %entry.room_number,
            score = entry.score,
            "top priority"
        );
    }

    // Front desk files a ticket for an occupied room
    ledger.switch_role(Role::Reception)?;
    let receipt = ledger.add_ticket(
        NewTicket::new(
            "305",
            "Electrical",
            "Not working / Won't turn on",
            "Bedside outlet has no power.",
        )
        .occupied(true)
        .severity(Urgency::High, Impact::Annoying),
    )?;
    info!(message = %receipt.message, "ticket filed");
    let outlet_ticket = receipt.ticket_id.ok_or("ticket receipt without id")?;

    // Maintenance reserves the outlet; the front desk cannot
    if let Err(error) = ledger.reserve_part_for_ticket(outlet_ticket, "P-001", 1) {
        warn!(%error, "reservation rejected");
    }
    ledger.switch_role(Role::Maintenance)?;
    let receipt = ledger.reserve_part_for_ticket(outlet_ticket, "P-001", 1)?;
    info!(message = %receipt.message, "part reserved");
    ledger.start_work(outlet_ticket)?;
    ledger.issue_reserved_part_for_ticket(outlet_ticket, Some("Installed".to_string()))?;
    ledger.resolve_ticket(outlet_ticket, 25, None)?;

    // Management restocks what the shopping list asks for
    ledger.switch_role(Role::Management)?;
    for suggestion in ledger.shopping_list() {
        if suggestion.on_order > 0 {
            continue;
        }
        let receipt = ledger.create_po_for_part(PurchaseOrderRequest::new(
            suggestion.part_id.clone(),
            i64::from(suggestion.suggested_quantity),
        ))?;
        if let Some(po_id) = receipt.po_id {
            ledger.receive_po(po_id)?;
            info!(
                part = %suggestion.part_id,
                quantity = suggestion.suggested_quantity,
                po = %po_id,
                "restocked"
            );
        }
    }
    ledger.verify_ticket(outlet_ticket, "Night Manager")?;

    for violation in ledger.stock_invariant_violations() {
        warn!(
            part = %violation.part_id,
            reserved = violation.reserved,
            on_hand = violation.on_hand,
            "over-reserved part"
        );
    }

    // Supervisor round
    ledger.switch_role(Role::Supervisor)?;
    let receipt = ledger.submit_inspection(
        "412",
        InspectionFinding::new("TV/WiFi", "No signal / Unprogrammed")
            .description("No picture on any channel"),
    )?;
    info!(message = %receipt.message, "inspection filed");
    ledger.register_inspection("413")?;

    let receipt = ledger.add_logbook_entry(
        NewLogbookEntry::new(LogbookKind::Pool)
            .reading("chlorine", 1.4)
            .reading("ph", 7.9)
            .reading("temperature", 27.0),
    )?;
    info!(message = %receipt.message, "logbook");

    if let Some(error) = ledger.last_persistence_error() {
        warn!(%error, "last save failed");
    }

    let board = ledger.dashboard();
    info!(
        pending = board.pending,
        verified_last_week = board.verified_last_week,
        revision = ledger.revision(),
        movements = ledger.movements().len(),
        "done"
    );
    println!("{}", ledger.export_csv());

    Ok(())
}
