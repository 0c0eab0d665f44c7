//! Domain types for the hotel operations ledger.
//!
//! Value objects, entities and request payloads shared by the reducer, the
//! read models and the persistence layer.

use crate::{classify, priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Error returned when a textual identifier does not match its prefix format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{input}'")]
pub struct IdParseError {
    /// Identifier type being parsed
    pub kind: &'static str,
    /// Rejected input
    pub input: String,
}

/// Declares a prefixed, sequence-backed identifier serialized as `"<PREFIX><n>"`.
macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(u32);

        impl $name {
            /// Textual prefix preceding the sequence number
            pub const PREFIX: &'static str = $prefix;

            /// Wrap a raw sequence number
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// The raw sequence number
            #[must_use]
            pub const fn value(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.strip_prefix(Self::PREFIX)
                    .and_then(|digits| digits.parse::<u32>().ok())
                    .map(Self)
                    .ok_or_else(|| IdParseError {
                        kind: stringify!($name),
                        input: s.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

sequence_id!(
    /// Ticket identifier, `T-<n>`
    TicketId,
    "T-"
);

sequence_id!(
    /// Stock movement identifier, `M-<n>`
    MovementId,
    "M-"
);

sequence_id!(
    /// Purchase order identifier, `PO-<n>`
    PurchaseOrderId,
    "PO-"
);

sequence_id!(
    /// Utility logbook entry identifier, `LOG-<n>`
    LogbookEntryId,
    "LOG-"
);

/// Inventory part identifier (catalogue code such as `P-001`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    /// Creates a new `PartId`
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the inner value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// Roles & Permissions
// ============================================================================

/// Operator role driving the permission matrix
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Hotel management
    #[default]
    Management,
    /// Housekeeping staff
    Cleaning,
    /// Front desk
    Reception,
    /// Maintenance technicians
    Maintenance,
    /// Floor supervisor running room inspections
    Supervisor,
}

impl Role {
    /// Every role, in menu order
    pub const ALL: [Self; 5] = [
        Self::Management,
        Self::Cleaning,
        Self::Reception,
        Self::Maintenance,
        Self::Supervisor,
    ];

    /// Permission matrix for this role
    #[must_use]
    pub const fn permissions(self) -> Permissions {
        Permissions::for_role(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Management => "Management",
            Self::Cleaning => "Cleaning",
            Self::Reception => "Reception",
            Self::Maintenance => "Maintenance",
            Self::Supervisor => "Floor Supervisor",
        };
        f.write_str(label)
    }
}

/// A role-gated ledger capability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    /// Read the parts inventory
    ViewInventory,
    /// Reserve, release and issue parts against tickets
    Reserve,
    /// Create and receive purchase orders
    CreatePurchaseOrder,
    /// Apply manual stock corrections
    AdjustStock,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ViewInventory => "view inventory",
            Self::Reserve => "reserve parts",
            Self::CreatePurchaseOrder => "manage purchase orders",
            Self::AdjustStock => "adjust stock",
        };
        f.write_str(label)
    }
}

/// Permission matrix derived from the active role. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Permissions {
    /// Management, Maintenance and Supervisor
    pub can_view_inventory: bool,
    /// Management and Maintenance
    pub can_reserve: bool,
    /// Management only
    pub can_create_po: bool,
    /// Management only
    pub can_adjust_stock: bool,
}

impl Permissions {
    /// Derive the matrix for `role`
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        let management = matches!(role, Role::Management);
        Self {
            can_view_inventory: matches!(
                role,
                Role::Management | Role::Maintenance | Role::Supervisor
            ),
            can_reserve: matches!(role, Role::Management | Role::Maintenance),
            can_create_po: management,
            can_adjust_stock: management,
        }
    }

    /// Check a single capability
    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewInventory => self.can_view_inventory,
            Capability::Reserve => self.can_reserve,
            Capability::CreatePurchaseOrder => self.can_create_po,
            Capability::AdjustStock => self.can_adjust_stock,
        }
    }
}

// ============================================================================
// Ticket classification enums
// ============================================================================

/// How soon the issue needs attention
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    /// Can wait
    Low,
    /// Same day
    Medium,
    /// Immediately
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(label)
    }
}

/// Effect of the issue on the room's usability
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Impact {
    /// Guest is not affected
    None,
    /// Guest is bothered
    Annoying,
    /// Room or asset cannot be used
    Blocking,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "No impact",
            Self::Annoying => "Annoying",
            Self::Blocking => "Blocks use",
        };
        f.write_str(label)
    }
}

/// Ticket lifecycle status
///
/// Reported → In Progress → Waiting Part / Vendor → Resolved → Verified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Newly filed
    #[default]
    Reported,
    /// A technician is working on it
    InProgress,
    /// Blocked on a part
    WaitingPart,
    /// Blocked on an external vendor
    Vendor,
    /// Work finished, awaiting verification
    Resolved,
    /// Terminal: checked and closed
    Verified,
}

impl TicketStatus {
    /// Not yet verified
    #[must_use]
    pub const fn is_pending(self) -> bool {
        !matches!(self, Self::Verified)
    }

    /// Waiting on a part or a vendor
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::WaitingPart | Self::Vendor)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reported => "Reported",
            Self::InProgress => "In Progress",
            Self::WaitingPart => "Waiting Part",
            Self::Vendor => "Vendor Required",
            Self::Resolved => "Resolved",
            Self::Verified => "Verified",
        };
        f.write_str(label)
    }
}

/// Specialty a ticket is routed to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceType {
    /// Electrical work
    Electrician,
    /// Plumbing work
    Plumber,
    /// Air conditioning and ventilation
    HvacTechnician,
    /// Furniture and woodwork
    Carpenter,
    /// TV, WiFi and networking
    TvNetworkTechnician,
    /// Locks and safes
    Locksmith,
    /// Anything else
    #[default]
    General,
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Electrician => "Electrician",
            Self::Plumber => "Plumber",
            Self::HvacTechnician => "HVAC Technician",
            Self::Carpenter => "Carpenter",
            Self::TvNetworkTechnician => "TV/Network Technician",
            Self::Locksmith => "Locksmith",
            Self::General => "General",
        };
        f.write_str(label)
    }
}

/// Who raised the ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketOrigin {
    /// Guest complaint
    Guest,
    /// Staff finding
    Staff,
    /// Generated by the ledger itself
    System,
}

impl TicketOrigin {
    /// Default origin for a ticket filed by `role`
    #[must_use]
    pub const fn for_creator(role: Role) -> Self {
        match role {
            Role::Reception => Self::Guest,
            _ => Self::Staff,
        }
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// One line of a ticket's append-only history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When it happened
    pub at: DateTime<Utc>,
    /// What happened
    pub action: String,
    /// Who did it (role label or `System`)
    pub actor: String,
}

impl AuditEntry {
    /// Creates a new `AuditEntry`
    #[must_use]
    pub fn new(at: DateTime<Utc>, action: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            at,
            action: action.into(),
            actor: actor.into(),
        }
    }
}

/// Soft hold of part stock against a ticket
///
/// Derived from the ticket's part linkage: a ticket holds stock while it needs
/// a part and names a part id with a positive quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Part being held
    pub part_id: PartId,
    /// Units held
    pub quantity: u32,
}

/// A tracked maintenance or housekeeping issue tied to a room
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// `T-<n>`
    pub id: TicketId,
    /// Room number, e.g. `"204"`
    pub room_number: String,
    /// Guest currently in the room
    pub is_occupied: bool,
    /// Asset category, e.g. `"Air Conditioning"`
    pub asset: String,
    /// Issue type, e.g. `"Not working"`
    pub issue_type: String,
    /// Free text
    pub description: String,
    /// Urgency
    pub urgency: Urgency,
    /// Impact
    pub impact: Impact,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Routing specialty derived from the asset
    pub maintenance_type: MaintenanceType,
    /// Who raised it
    pub origin: TicketOrigin,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Creator role
    pub created_by: Role,
    /// Assigned technician
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Free-text notes, in order
    #[serde(default)]
    pub notes: Vec<String>,
    /// Append-only audit trail
    #[serde(default)]
    pub history: Vec<AuditEntry>,

    /// The ticket is waiting on a part
    #[serde(default)]
    pub needs_part: bool,
    /// Linked part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<PartId>,
    /// Linked part name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    /// Requested part quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_qty: Option<u32>,

    /// Room a part was taken from to fix this ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cannibalized_from_room: Option<String>,

    /// An external vendor is required
    #[serde(default)]
    pub needs_vendor: bool,
    /// Kind of vendor required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_type: Option<String>,
    /// Linked purchase order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_id: Option<PurchaseOrderId>,

    /// Who verified the fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    /// When the ticket was closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Minutes of work spent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u32>,
    /// Evidence photo reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,

    #[serde(default)]
    pub(crate) priority_score: u8,
}

impl Ticket {
    /// Build a freshly filed ticket
    ///
    /// Status defaults to Reported, origin to the actor's default, the
    /// maintenance type is derived from the asset and the score is computed.
    #[must_use]
    pub(crate) fn create(id: TicketId, data: NewTicket, created_at: DateTime<Utc>, actor: Role) -> Self {
        let maintenance_type = classify::maintenance_type_for(&data.asset);
        let mut ticket = Self {
            id,
            room_number: data.room_number,
            is_occupied: data.is_occupied,
            asset: data.asset,
            issue_type: data.issue_type,
            description: data.description,
            urgency: data.urgency,
            impact: data.impact,
            status: data.status.unwrap_or_default(),
            maintenance_type,
            origin: data.origin.unwrap_or(TicketOrigin::for_creator(actor)),
            created_at,
            created_by: data.created_by.unwrap_or(actor),
            assigned_to: data.assigned_to,
            notes: data.notes,
            history: vec![AuditEntry::new(created_at, "Ticket created", actor.to_string())],
            needs_part: data.needs_part,
            part_id: data.part_id,
            part_name: data.part_name,
            part_qty: data.part_qty,
            cannibalized_from_room: None,
            needs_vendor: data.needs_vendor,
            vendor_type: data.vendor_type,
            po_id: None,
            verified_by: None,
            closed_at: None,
            time_spent_minutes: None,
            evidence_url: None,
            priority_score: 0,
        };
        ticket.rescore();
        ticket
    }

    /// Derived priority score, `0..=100`
    #[must_use]
    pub const fn priority_score(&self) -> u8 {
        self.priority_score
    }

    /// Score is above the flame tier threshold
    #[must_use]
    pub const fn is_flame(&self, threshold: u8) -> bool {
        self.priority_score > threshold
    }

    /// Active stock hold, if any
    #[must_use]
    pub fn reservation(&self) -> Option<Reservation> {
        match (&self.part_id, self.part_qty) {
            (Some(part_id), Some(quantity)) if self.needs_part && quantity > 0 => Some(Reservation {
                part_id: part_id.clone(),
                quantity,
            }),
            _ => None,
        }
    }

    /// Recompute the score from the current fields
    pub(crate) fn rescore(&mut self) {
        self.priority_score =
            priority::priority_score(self.urgency, self.impact, self.is_occupied, self.status);
    }

    /// Merge `patch`, append `audit` and rescore
    pub(crate) fn record(&mut self, patch: &TicketPatch, audit: AuditEntry) {
        patch.apply_to(self);
        self.history.push(audit);
        self.rescore();
    }
}

/// Data for filing a new ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    /// Room number
    pub room_number: String,
    /// Guest currently in the room
    pub is_occupied: bool,
    /// Asset category
    pub asset: String,
    /// Issue type
    pub issue_type: String,
    /// Free text
    pub description: String,
    /// Urgency
    pub urgency: Urgency,
    /// Impact
    pub impact: Impact,
    /// Initial status, Reported when absent
    pub status: Option<TicketStatus>,
    /// Origin, derived from the acting role when absent
    pub origin: Option<TicketOrigin>,
    /// Creator role, the acting role when absent
    pub created_by: Option<Role>,
    /// Assigned technician
    pub assigned_to: Option<String>,
    /// Initial notes
    pub notes: Vec<String>,
    /// Waiting on a part
    pub needs_part: bool,
    /// Linked part
    pub part_id: Option<PartId>,
    /// Linked part name
    pub part_name: Option<String>,
    /// Requested quantity
    pub part_qty: Option<u32>,
    /// External vendor required
    pub needs_vendor: bool,
    /// Kind of vendor
    pub vendor_type: Option<String>,
}

impl NewTicket {
    /// Medium urgency, annoying impact, unoccupied room
    #[must_use]
    pub fn new(
        room_number: impl Into<String>,
        asset: impl Into<String>,
        issue_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            room_number: room_number.into(),
            is_occupied: false,
            asset: asset.into(),
            issue_type: issue_type.into(),
            description: description.into(),
            urgency: Urgency::Medium,
            impact: Impact::Annoying,
            status: None,
            origin: None,
            created_by: None,
            assigned_to: None,
            notes: Vec::new(),
            needs_part: false,
            part_id: None,
            part_name: None,
            part_qty: None,
            needs_vendor: false,
            vendor_type: None,
        }
    }

    /// Set urgency and impact
    #[must_use]
    pub const fn severity(mut self, urgency: Urgency, impact: Impact) -> Self {
        self.urgency = urgency;
        self.impact = impact;
        self
    }

    /// Mark the room as occupied
    #[must_use]
    pub const fn occupied(mut self, is_occupied: bool) -> Self {
        self.is_occupied = is_occupied;
        self
    }

    /// Override the initial status
    #[must_use]
    pub const fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Override the origin
    #[must_use]
    pub const fn with_origin(mut self, origin: TicketOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Override the creator role
    #[must_use]
    pub const fn created_by(mut self, role: Role) -> Self {
        self.created_by = Some(role);
        self
    }

    /// Append an initial note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Link a part the ticket waits on
    #[must_use]
    pub fn needing_part(mut self, part_id: PartId, part_name: impl Into<String>, quantity: u32) -> Self {
        self.needs_part = true;
        self.part_id = Some(part_id);
        self.part_name = Some(part_name.into());
        self.part_qty = Some(quantity);
        self
    }
}

/// Partial update merged into a ticket
///
/// Absent fields are left untouched. There is no priority field: the score is
/// recomputed after every merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    /// Room number
    pub room_number: Option<String>,
    /// Occupancy
    pub is_occupied: Option<bool>,
    /// Asset
    pub asset: Option<String>,
    /// Issue type
    pub issue_type: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Urgency
    pub urgency: Option<Urgency>,
    /// Impact
    pub impact: Option<Impact>,
    /// Status
    pub status: Option<TicketStatus>,
    /// Assigned technician
    pub assigned_to: Option<String>,
    /// Note appended to the ticket
    pub note: Option<String>,
    /// Needs-part flag
    pub needs_part: Option<bool>,
    /// Linked part
    pub part_id: Option<PartId>,
    /// Linked part name
    pub part_name: Option<String>,
    /// Requested quantity
    pub part_qty: Option<u32>,
    /// Needs-vendor flag
    pub needs_vendor: Option<bool>,
    /// Vendor kind
    pub vendor_type: Option<String>,
    /// Linked purchase order
    pub po_id: Option<PurchaseOrderId>,
    /// Verifier
    pub verified_by: Option<String>,
    /// Close time
    pub closed_at: Option<DateTime<Utc>>,
    /// Minutes of work
    pub time_spent_minutes: Option<u32>,
    /// Evidence reference
    pub evidence_url: Option<String>,
    /// Room a part was taken from
    pub cannibalized_from_room: Option<String>,
}

impl TicketPatch {
    /// Empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch edits the fields a stock reservation is derived from
    #[must_use]
    pub const fn touches_part_linkage(&self) -> bool {
        self.needs_part.is_some() || self.part_id.is_some() || self.part_qty.is_some()
    }

    /// Set status
    #[must_use]
    pub const fn status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set urgency
    #[must_use]
    pub const fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// Set impact
    #[must_use]
    pub const fn impact(mut self, impact: Impact) -> Self {
        self.impact = Some(impact);
        self
    }

    /// Set occupancy
    #[must_use]
    pub const fn occupied(mut self, is_occupied: bool) -> Self {
        self.is_occupied = Some(is_occupied);
        self
    }

    /// Set assignee
    #[must_use]
    pub fn assigned_to(mut self, technician: impl Into<String>) -> Self {
        self.assigned_to = Some(technician.into());
        self
    }

    /// Append a note
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Set description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn apply_to(&self, ticket: &mut Ticket) {
        fn merge<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        fn merge_opt<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        merge(&mut ticket.room_number, self.room_number.as_ref());
        merge(&mut ticket.is_occupied, self.is_occupied.as_ref());
        merge(&mut ticket.asset, self.asset.as_ref());
        merge(&mut ticket.issue_type, self.issue_type.as_ref());
        merge(&mut ticket.description, self.description.as_ref());
        merge(&mut ticket.urgency, self.urgency.as_ref());
        merge(&mut ticket.impact, self.impact.as_ref());
        merge(&mut ticket.status, self.status.as_ref());
        merge(&mut ticket.needs_part, self.needs_part.as_ref());
        merge(&mut ticket.needs_vendor, self.needs_vendor.as_ref());
        merge_opt(&mut ticket.assigned_to, self.assigned_to.as_ref());
        merge_opt(&mut ticket.part_id, self.part_id.as_ref());
        merge_opt(&mut ticket.part_name, self.part_name.as_ref());
        merge_opt(&mut ticket.part_qty, self.part_qty.as_ref());
        merge_opt(&mut ticket.vendor_type, self.vendor_type.as_ref());
        merge_opt(&mut ticket.po_id, self.po_id.as_ref());
        merge_opt(&mut ticket.verified_by, self.verified_by.as_ref());
        merge_opt(&mut ticket.closed_at, self.closed_at.as_ref());
        merge_opt(&mut ticket.time_spent_minutes, self.time_spent_minutes.as_ref());
        merge_opt(&mut ticket.evidence_url, self.evidence_url.as_ref());
        merge_opt(&mut ticket.cannibalized_from_room, self.cannibalized_from_room.as_ref());
        if let Some(note) = &self.note {
            ticket.notes.push(note.clone());
        }
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// A stocked spare part
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPart {
    /// Catalogue id
    pub id: PartId,
    /// Display name
    pub name: String,
    /// Category, e.g. `"Electrical"`
    pub category: String,
    /// Unit of measure, e.g. `"pc"`
    pub unit: String,
    /// Physical count
    pub on_hand: u32,
    /// Units soft-held for tickets
    pub reserved: u32,
    /// Reorder threshold
    pub min_stock: u32,
    /// Preferred vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_vendor: Option<String>,
    /// Vendor lead time in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<u32>,
    /// Shelf or storeroom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stock keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl InventoryPart {
    /// Creates a part with no reservations and no vendor metadata
    #[must_use]
    pub fn new(
        id: impl Into<PartId>,
        name: impl Into<String>,
        category: impl Into<String>,
        unit: impl Into<String>,
        on_hand: u32,
        min_stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            unit: unit.into(),
            on_hand,
            reserved: 0,
            min_stock,
            preferred_vendor: None,
            lead_time_days: None,
            location: None,
            sku: None,
        }
    }

    /// Set preferred vendor and lead time
    #[must_use]
    pub fn supplied_by(mut self, vendor: impl Into<String>, lead_time_days: u32) -> Self {
        self.preferred_vendor = Some(vendor.into());
        self.lead_time_days = Some(lead_time_days);
        self
    }

    /// Set storage location and SKU
    #[must_use]
    pub fn stored_at(mut self, location: impl Into<String>, sku: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self.sku = Some(sku.into());
        self
    }

    /// `on_hand − reserved`, never negative
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.on_hand.saturating_sub(self.reserved)
    }
}

/// Kind of stock-affecting event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Held for a ticket
    Reserve,
    /// Hold returned
    Release,
    /// Consumed by a ticket
    Issue,
    /// Received from a purchase order line
    Receive,
    /// Manual correction
    Adjust,
    /// Purchase order raised
    PoCreated,
    /// Purchase order sent to the vendor
    PoSent,
    /// Purchase order fully received
    PoReceived,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reserve => "RESERVE",
            Self::Release => "RELEASE",
            Self::Issue => "ISSUE",
            Self::Receive => "RECEIVE",
            Self::Adjust => "ADJUST",
            Self::PoCreated => "PO_CREATED",
            Self::PoSent => "PO_SENT",
            Self::PoReceived => "PO_RECEIVED",
        };
        f.write_str(label)
    }
}

/// Immutable stock movement record
///
/// `quantity` is never negative; the kind says whether it adds or removes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartMovement {
    /// `M-<n>`
    pub id: MovementId,
    /// Part affected
    pub part_id: PartId,
    /// Movement kind
    #[serde(rename = "type")]
    pub kind: MovementKind,
    /// Units moved
    pub quantity: u32,
    /// When
    pub at: DateTime<Utc>,
    /// Acting role
    pub actor: Role,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Related ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
    /// Related purchase order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_id: Option<PurchaseOrderId>,
}

impl PartMovement {
    /// Attach a note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Link to a ticket
    #[must_use]
    pub const fn for_ticket(mut self, ticket_id: TicketId) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }

    /// Link to a purchase order
    #[must_use]
    pub const fn for_po(mut self, po_id: PurchaseOrderId) -> Self {
        self.po_id = Some(po_id);
        self
    }
}

// ============================================================================
// Purchase orders
// ============================================================================

/// Purchase order status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    /// Not yet sent (unused by the creation flow)
    Draft,
    /// Sent to the vendor, awaiting delivery
    Ordered,
    /// Delivered and added to stock
    Received,
    /// Abandoned
    Canceled,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Draft => "Draft",
            Self::Ordered => "Ordered",
            Self::Received => "Received",
            Self::Canceled => "Canceled",
        };
        f.write_str(label)
    }
}

/// One ordered part
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// Part ordered
    pub part_id: PartId,
    /// Part name at ordering time
    pub part_name: String,
    /// Units ordered
    pub quantity: u32,
    /// Unit of measure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Replenishment order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// `PO-<n>`
    pub id: PurchaseOrderId,
    /// Status
    pub status: PurchaseOrderStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Creator role
    pub created_by: Role,
    /// Vendor name
    pub vendor: String,
    /// Expected arrival
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
    /// Ordered lines
    pub lines: Vec<PurchaseOrderLine>,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PurchaseOrder {
    /// Sum of line quantities
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// Parameters for ordering a single part
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderRequest {
    /// Part to order
    pub part_id: PartId,
    /// Requested quantity, clamped to at least one
    pub quantity: i64,
    /// Vendor, else the part's preferred vendor, else the placeholder
    pub vendor: Option<String>,
    /// ETA in days, else the part's lead time, else the configured default
    pub eta_days: Option<u32>,
    /// Ticket to link the order to
    pub ticket_id: Option<TicketId>,
}

impl PurchaseOrderRequest {
    /// Order `quantity` units of `part_id`
    #[must_use]
    pub fn new(part_id: impl Into<PartId>, quantity: i64) -> Self {
        Self {
            part_id: part_id.into(),
            quantity,
            vendor: None,
            eta_days: None,
            ticket_id: None,
        }
    }

    /// Override the vendor
    #[must_use]
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Override the ETA
    #[must_use]
    pub const fn eta_days(mut self, days: u32) -> Self {
        self.eta_days = Some(days);
        self
    }

    /// Link to a ticket
    #[must_use]
    pub const fn for_ticket(mut self, ticket_id: TicketId) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Successful operation outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Human-readable message
    pub message: String,
    /// Ticket created or touched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
    /// Purchase order created or touched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_id: Option<PurchaseOrderId>,
}

impl Receipt {
    /// Receipt with a message only
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ticket_id: None,
            po_id: None,
        }
    }

    /// Attach a ticket id
    #[must_use]
    pub const fn with_ticket(mut self, ticket_id: TicketId) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }

    /// Attach a purchase order id
    #[must_use]
    pub const fn with_po(mut self, po_id: PurchaseOrderId) -> Self {
        self.po_id = Some(po_id);
        self
    }
}
