//! Supervisor room inspections.

use crate::types::{PartId, Urgency};
use serde::{Deserialize, Serialize};

/// One room-exit checklist item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Stable id
    pub id: &'static str,
    /// What the supervisor checks
    pub label: &'static str,
}

/// Checklist walked on every room exit
pub const ROOM_EXIT_CHECKLIST: [ChecklistItem; 6] = [
    ChecklistItem { id: "lights", label: "Lighting (all fixtures turn on)" },
    ChecklistItem { id: "tv", label: "TV and remote (signal OK)" },
    ChecklistItem { id: "ac", label: "A/C and remote (cools, configured)" },
    ChecklistItem { id: "water", label: "Faucets and toilet (no leaks)" },
    ChecklistItem { id: "lock", label: "Door lock (works)" },
    ChecklistItem { id: "safe", label: "Safe (open, batteries OK)" },
];

/// Look up a checklist item by id
#[must_use]
pub fn checklist_item(id: &str) -> Option<&'static ChecklistItem> {
    ROOM_EXIT_CHECKLIST.iter().find(|item| item.id == id)
}

/// A failed check reported from an inspection
///
/// Files one ticket for the room. When a part is given the ticket starts in
/// Waiting-Part, linked to that part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFinding {
    /// Asset category
    pub asset: String,
    /// Issue type
    pub issue_type: String,
    /// Urgency
    pub urgency: Urgency,
    /// Free text, generated from issue and asset when absent
    pub description: Option<String>,
    /// Part needed for the fix
    pub part_id: Option<PartId>,
}

impl InspectionFinding {
    /// Medium-urgency finding without a part
    #[must_use]
    pub fn new(asset: impl Into<String>, issue_type: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            issue_type: issue_type.into(),
            urgency: Urgency::Medium,
            description: None,
            part_id: None,
        }
    }

    /// Override urgency
    #[must_use]
    pub const fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Attach a description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Request a part
    #[must_use]
    pub fn needing_part(mut self, part_id: impl Into<PartId>) -> Self {
        self.part_id = Some(part_id.into());
        self
    }

    /// Description used on the filed ticket
    #[must_use]
    pub fn ticket_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Inspection report: {} on {}", self.issue_type, self.asset))
    }
}
