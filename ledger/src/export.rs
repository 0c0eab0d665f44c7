//! Ticket export.

use crate::types::Ticket;
use std::fmt::Write;

/// CSV header row
pub const CSV_HEADER: &str = "ID,Room,Status,Description";

/// Tickets as CSV, one row per ticket
///
/// Fields are joined with commas as-is; values containing commas or newlines
/// are not quoted.
#[must_use]
pub fn tickets_csv(tickets: &[Ticket]) -> String {
    let mut csv = String::from(CSV_HEADER);
    for ticket in tickets {
        // Writing to a String cannot fail
        let _ = write!(
            csv,
            "\n{},{},{},{}",
            ticket.id, ticket.room_number, ticket.status, ticket.description
        );
    }
    csv
}
