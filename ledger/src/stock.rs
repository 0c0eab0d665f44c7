//! Stock analytics: badges, reorder suggestions and invariant checks.
//!
//! Pure read models over the inventory, tickets and purchase orders.

use crate::classify;
use crate::types::{
    InventoryPart, PartId, PurchaseOrder, PurchaseOrderStatus, Ticket, TicketId, TicketStatus,
};
use serde::{Deserialize, Serialize};

/// Stock badge shown next to a part
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    /// Nothing on hand
    Out,
    /// At or below the reorder threshold
    Low,
    /// Above the reorder threshold
    Ok,
}

/// Badge for a part
#[must_use]
pub const fn stock_level(part: &InventoryPart) -> StockLevel {
    if part.on_hand == 0 {
        StockLevel::Out
    } else if should_reorder(part) {
        StockLevel::Low
    } else {
        StockLevel::Ok
    }
}

/// On-hand stock is at or below the reorder threshold
#[must_use]
pub const fn should_reorder(part: &InventoryPart) -> bool {
    part.on_hand <= part.min_stock
}

/// Quantity awaited by open Waiting-Part tickets referencing `part_id`,
/// with the tickets doing the waiting
#[must_use]
pub fn awaited_by_tickets(tickets: &[Ticket], part_id: &PartId) -> (u32, Vec<TicketId>) {
    tickets
        .iter()
        .filter(|ticket| {
            ticket.status == TicketStatus::WaitingPart && ticket.part_id.as_ref() == Some(part_id)
        })
        .fold((0, Vec::new()), |(total, mut ids), ticket| {
            ids.push(ticket.id);
            (total.saturating_add(ticket.part_qty.unwrap_or(1).max(1)), ids)
        })
}

/// Suggested order quantity
///
/// The larger of the gap between on-hand stock and the target level
/// (`target_factor × min_stock`) and the quantity awaited by tickets.
/// Never zero.
#[must_use]
pub const fn suggested_reorder_quantity(part: &InventoryPart, awaited: u32, target_factor: u32) -> u32 {
    let target = part.min_stock.saturating_mul(target_factor);
    let gap = target.saturating_sub(part.on_hand);
    let wanted = if gap > awaited { gap } else { awaited };
    if wanted == 0 { 1 } else { wanted }
}

/// Units of `part_id` on open purchase orders
#[must_use]
pub fn on_order(purchase_orders: &[PurchaseOrder], part_id: &PartId) -> u32 {
    purchase_orders
        .iter()
        .filter(|order| order.status == PurchaseOrderStatus::Ordered)
        .flat_map(|order| &order.lines)
        .filter(|line| &line.part_id == part_id)
        .fold(0, |total: u32, line| total.saturating_add(line.quantity))
}

/// One shopping-list line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    /// Part
    pub part_id: PartId,
    /// Part name
    pub part_name: String,
    /// Badge
    pub level: StockLevel,
    /// Physical count
    pub on_hand: u32,
    /// Units held for tickets
    pub reserved: u32,
    /// Reorder threshold
    pub min_stock: u32,
    /// Units awaited by Waiting-Part tickets
    pub awaited: u32,
    /// Units already on open purchase orders
    pub on_order: u32,
    /// Suggested order quantity
    pub suggested_quantity: u32,
    /// Tickets waiting on the part
    pub waiting_tickets: Vec<TicketId>,
    /// Preferred vendor
    pub preferred_vendor: Option<String>,
}

/// Parts that should be reordered or are awaited by tickets, in catalogue order
#[must_use]
pub fn shopping_list(
    parts: &[InventoryPart],
    tickets: &[Ticket],
    purchase_orders: &[PurchaseOrder],
    target_factor: u32,
) -> Vec<ReorderSuggestion> {
    parts
        .iter()
        .filter_map(|part| {
            let (awaited, waiting_tickets) = awaited_by_tickets(tickets, &part.id);
            if !should_reorder(part) && awaited == 0 {
                return None;
            }
            Some(ReorderSuggestion {
                part_id: part.id.clone(),
                part_name: part.name.clone(),
                level: stock_level(part),
                on_hand: part.on_hand,
                reserved: part.reserved,
                min_stock: part.min_stock,
                awaited,
                on_order: on_order(purchase_orders, &part.id),
                suggested_quantity: suggested_reorder_quantity(part, awaited, target_factor),
                waiting_tickets,
                preferred_vendor: part.preferred_vendor.clone(),
            })
        })
        .collect()
}

/// A part whose reserved stock exceeds its physical count
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockViolation {
    /// Part
    pub part_id: PartId,
    /// Physical count
    pub on_hand: u32,
    /// Units held
    pub reserved: u32,
}

/// Report every part where `reserved > on_hand`
///
/// Stock arithmetic clamps at zero instead of rejecting, so a manual
/// adjustment can leave more units held than exist. This report surfaces them.
#[must_use]
pub fn stock_invariant_violations(parts: &[InventoryPart]) -> Vec<StockViolation> {
    parts
        .iter()
        .filter(|part| part.reserved > part.on_hand)
        .map(|part| StockViolation {
            part_id: part.id.clone(),
            on_hand: part.on_hand,
            reserved: part.reserved,
        })
        .collect()
}

/// Parts stocked for an asset category
#[must_use]
pub fn parts_for_asset<'a>(parts: &'a [InventoryPart], asset: &str) -> Vec<&'a InventoryPart> {
    match classify::part_category_for(asset) {
        Some(category) => parts.iter().filter(|part| part.category == category).collect(),
        None => parts.iter().collect(),
    }
}
