//! # Hotel Ops Ledger
//!
//! Operations ledger for a hotel: maintenance tickets with derived priority
//! scores, a parts inventory with reservations and a movement log, purchase
//! orders, supervisor inspections and utility logbooks.
//!
//! All writes go through [`Ledger`], which validates each command against the
//! current state before applying it. Rejected commands leave the state
//! untouched; accepted commands bump the revision and are mirrored to the
//! configured [`KeyValueStore`](hotel_ops_core::storage::KeyValueStore).
//!
//! ## Example
//!
//! ```ignore
//! use hotel_ops_core::environment::SystemClock;
//! use hotel_ops_ledger::{Ledger, LedgerConfig, LedgerEnvironment, TicketId};
//! use std::sync::Arc;
//!
//! let env = LedgerEnvironment::new(Arc::new(SystemClock), LedgerConfig::default());
//! let mut ledger = Ledger::seeded(env);
//!
//! ledger.reserve_part_for_ticket(TicketId::new(8003), "P-001", 1)?;
//! println!("{}", ledger.export_csv());
//! ```

pub mod action;
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod inspection;
pub mod ledger;
pub mod logbook;
pub mod persistence;
pub mod priority;
pub mod reducer;
pub mod seed;
pub mod state;
pub mod stock;
pub mod types;

pub use action::LedgerAction;
pub use config::{ConfigError, LedgerConfig};
pub use dashboard::Dashboard;
pub use error::{EntityKind, LedgerError};
pub use inspection::{InspectionFinding, ROOM_EXIT_CHECKLIST};
pub use ledger::Ledger;
pub use logbook::{LogbookKind, NewLogbookEntry, ReadingStatus};
pub use persistence::{Collection, JsonDirectoryStore, PersistenceError};
pub use reducer::{LedgerEnvironment, LedgerReducer};
pub use state::LedgerState;
pub use types::*;
