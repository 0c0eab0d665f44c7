//! Tests for #[derive(Action)] macro

use chrono::{DateTime, Utc};
use hotel_ops_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum PartAction {
    #[command]
    ReservePart {
        ticket_id: u32,
        quantity: u32,
    },

    #[command]
    ResetDemoData,

    #[command]
    AdjustStock(i64),

    #[event]
    StockReserved {
        part_id: String,
        quantity: u32,
        reserved_at: DateTime<Utc>,
    },

    #[event]
    DemoDataReset,

    Rejected(String),
}

#[test]
fn test_is_command() {
    let action = PartAction::ReservePart {
        ticket_id: 1001,
        quantity: 1,
    };
    assert!(action.is_command());
    assert!(!action.is_event());
    assert!(PartAction::ResetDemoData.is_command());
    assert!(PartAction::AdjustStock(-3).is_command());
}

#[test]
fn test_is_event() {
    let action = PartAction::StockReserved {
        part_id: "P-001".to_string(),
        quantity: 1,
        reserved_at: Utc::now(),
    };
    assert!(!action.is_command());
    assert!(action.is_event());
    assert!(PartAction::DemoDataReset.is_event());
}

#[test]
fn test_event_type_is_versioned() {
    let action = PartAction::StockReserved {
        part_id: "P-001".to_string(),
        quantity: 2,
        reserved_at: Utc::now(),
    };
    assert_eq!(action.event_type(), "StockReserved.v1");
    assert_eq!(PartAction::DemoDataReset.event_type(), "DemoDataReset.v1");
}

#[test]
fn test_commands_have_no_event_type() {
    assert_eq!(PartAction::ResetDemoData.event_type(), "unknown");
    assert_eq!(PartAction::AdjustStock(1).event_type(), "unknown");
}

#[test]
fn test_unmarked_variant_is_neither() {
    let action = PartAction::Rejected("no stock".to_string());
    assert!(!action.is_command());
    assert!(!action.is_event());
    assert_eq!(action.event_type(), "unknown");
}

#[test]
fn test_name_covers_every_variant() {
    assert_eq!(PartAction::ResetDemoData.name(), "ResetDemoData");
    assert_eq!(PartAction::AdjustStock(0).name(), "AdjustStock");
    assert_eq!(PartAction::Rejected(String::new()).name(), "Rejected");
    assert_eq!(
        PartAction::ReservePart {
            ticket_id: 1,
            quantity: 1
        }
        .name(),
        "ReservePart"
    );
}
