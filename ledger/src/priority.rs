//! Ticket priority scoring.
//!
//! The score is a pure function of urgency, impact, occupancy and status. It
//! is stored on the ticket for cheap sorting but only ever written by
//! [`Ticket::rescore`](crate::types::Ticket), which every ticket mutation calls.

use crate::types::{Impact, TicketStatus, Urgency};

/// Highest possible score
pub const MAX_SCORE: u8 = 100;

/// Scores above this value are in the "flame" tier
pub const DEFAULT_FLAME_THRESHOLD: u8 = 80;

const OCCUPIED_WEIGHT: u8 = 20;

const fn urgency_weight(urgency: Urgency) -> u8 {
    match urgency {
        Urgency::Low => 10,
        Urgency::Medium => 25,
        Urgency::High => 40,
    }
}

const fn impact_weight(impact: Impact) -> u8 {
    match impact {
        Impact::None => 0,
        Impact::Annoying => 15,
        Impact::Blocking => 30,
    }
}

// Untouched tickets float above ones already being handled.
const fn status_weight(status: TicketStatus) -> u8 {
    match status {
        TicketStatus::Reported => 10,
        TicketStatus::WaitingPart => 8,
        TicketStatus::InProgress => 5,
        TicketStatus::Vendor => 3,
        TicketStatus::Resolved | TicketStatus::Verified => 0,
    }
}

/// Compute the priority score, `0..=MAX_SCORE`
///
/// Monotonic in urgency and impact; an occupied room never scores below the
/// same ticket in an empty room.
///
/// # Example
///
/// ```
/// use hotel_ops_ledger::priority::priority_score;
/// use hotel_ops_ledger::types::{Impact, TicketStatus, Urgency};
///
/// let worst = priority_score(Urgency::High, Impact::Blocking, true, TicketStatus::Reported);
/// assert_eq!(worst, 100);
/// ```
#[must_use]
pub const fn priority_score(
    urgency: Urgency,
    impact: Impact,
    is_occupied: bool,
    status: TicketStatus,
) -> u8 {
    let occupancy = if is_occupied { OCCUPIED_WEIGHT } else { 0 };
    let score = urgency_weight(urgency) + impact_weight(impact) + occupancy + status_weight(status);
    if score > MAX_SCORE { MAX_SCORE } else { score }
}

/// Score is strictly above `threshold`
#[must_use]
pub const fn is_flame(score: u8, threshold: u8) -> bool {
    score > threshold
}
