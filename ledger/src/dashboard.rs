//! Dashboard read model.

use crate::types::{Impact, Ticket, TicketId, TicketStatus, Urgency};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Number of tickets listed in [`Dashboard::top_priority`]
pub const TOP_PRIORITY_LEN: usize = 5;

/// Window for [`Dashboard::verified_last_week`]
const VERIFIED_WINDOW_DAYS: i64 = 7;

/// Summary entry for a high-priority ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriorityEntry {
    /// Ticket
    pub ticket_id: TicketId,
    /// Room
    pub room_number: String,
    /// Asset
    pub asset: String,
    /// Score at the time of the snapshot
    pub score: u8,
    /// Status
    pub status: TicketStatus,
}

/// Ticket counters as of a point in time
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Tickets not yet verified
    pub pending: usize,
    /// Pending tickets that are high urgency and blocking
    pub critical: usize,
    /// Pending tickets waiting on a part or a vendor
    pub blocked: usize,
    /// Tickets closed within the last seven days
    pub verified_last_week: usize,
    /// Highest-scoring pending tickets, best first
    pub top_priority: Vec<PriorityEntry>,
    /// Ticket count per asset
    pub tickets_per_asset: BTreeMap<String, usize>,
}

/// Build the dashboard over `tickets`
#[must_use]
pub fn dashboard(tickets: &[Ticket], now: DateTime<Utc>) -> Dashboard {
    let pending: Vec<&Ticket> = tickets.iter().filter(|t| t.status.is_pending()).collect();
    let since = now - Duration::days(VERIFIED_WINDOW_DAYS);

    let mut ranked = pending.clone();
    // Stable: ties keep ledger order
    ranked.sort_by_key(|t| Reverse(t.priority_score()));

    let mut tickets_per_asset = BTreeMap::new();
    for ticket in tickets {
        *tickets_per_asset.entry(ticket.asset.clone()).or_insert(0) += 1;
    }

    Dashboard {
        pending: pending.len(),
        critical: pending
            .iter()
            .filter(|t| t.urgency == Urgency::High && t.impact == Impact::Blocking)
            .count(),
        blocked: pending.iter().filter(|t| t.status.is_blocked()).count(),
        verified_last_week: tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Verified)
            .filter(|t| t.closed_at.is_some_and(|closed| closed >= since))
            .count(),
        top_priority: ranked
            .into_iter()
            .take(TOP_PRIORITY_LEN)
            .map(|t| PriorityEntry {
                ticket_id: t.id,
                room_number: t.room_number.clone(),
                asset: t.asset.clone(),
                score: t.priority_score(),
                status: t.status,
            })
            .collect(),
        tickets_per_asset,
    }
}
