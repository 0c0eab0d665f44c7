//! Asset classification: maintenance routing and part-category lookup.

use crate::types::MaintenanceType;

/// Asset categories offered when filing a ticket
pub const ASSETS: [&str; 10] = [
    "Air Conditioning",
    "Plumbing",
    "Electrical",
    "TV/WiFi",
    "Furniture",
    "Locks",
    "Bathroom Fixtures",
    "Linens / Amenities",
    "Appliances",
    "Other",
];

/// Issue types offered when filing a ticket
pub const ISSUE_TYPES: [&str; 10] = [
    "Not working / Won't turn on",
    "Broken / Physically damaged",
    "Missing / Lost",
    "Low / Dead battery",
    "Dirty / Stained",
    "Dripping / Water leak",
    "Abnormal noise",
    "Bad smell",
    "No signal / Unprogrammed",
    "Clogged / Blocked",
];

/// Route an asset category to a maintenance specialty
///
/// Matching is case-insensitive on keywords so free-text assets still route.
/// Unknown assets fall back to [`MaintenanceType::General`].
#[must_use]
pub fn maintenance_type_for(asset: &str) -> MaintenanceType {
    let asset = asset.to_lowercase();
    let has = |keyword: &str| asset.contains(keyword);

    if has("air con") || has("hvac") || has("a/c") {
        MaintenanceType::HvacTechnician
    } else if has("plumb") {
        MaintenanceType::Plumber
    } else if has("electr") {
        MaintenanceType::Electrician
    } else if has("tv") || has("wifi") {
        MaintenanceType::TvNetworkTechnician
    } else if has("furniture") {
        MaintenanceType::Carpenter
    } else if has("lock") {
        MaintenanceType::Locksmith
    } else {
        MaintenanceType::General
    }
}

/// Inventory category holding spare parts for an asset, if any
#[must_use]
pub fn part_category_for(asset: &str) -> Option<&'static str> {
    match maintenance_type_for(asset) {
        MaintenanceType::HvacTechnician => Some("HVAC"),
        MaintenanceType::Plumber => Some("Plumbing"),
        MaintenanceType::Electrician => Some("Electrical"),
        MaintenanceType::TvNetworkTechnician => Some("TV/WiFi"),
        MaintenanceType::Carpenter => Some("Furniture"),
        MaintenanceType::Locksmith => Some("Locks"),
        MaintenanceType::General => None,
    }
}
