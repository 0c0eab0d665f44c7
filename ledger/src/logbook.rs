//! Utility logbooks: pool, boiler and energy readings.
//!
//! Each kind has a fixed set of fields with a normal range and a critical
//! range. An entry's status is computed from its readings when it is added.

use crate::types::{LogbookEntryId, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of utility log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogbookKind {
    /// Swimming pool chemistry
    Pool,
    /// Boiler room
    Boilers,
    /// Electricity meter
    Energy,
}

impl fmt::Display for LogbookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pool => "Pool",
            Self::Boilers => "Boilers",
            Self::Energy => "Energy",
        };
        f.write_str(label)
    }
}

/// A reading field with its normal and critical bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSpec {
    /// Reading key
    pub key: &'static str,
    /// Display label
    pub label: &'static str,
    /// Unit suffix
    pub unit: &'static str,
    /// Lower normal bound
    pub min: f64,
    /// Upper normal bound
    pub max: f64,
    /// Lower critical bound
    pub critical_min: f64,
    /// Upper critical bound
    pub critical_max: f64,
}

impl FieldSpec {
    const fn new(
        key: &'static str,
        label: &'static str,
        unit: &'static str,
        normal: (f64, f64),
        critical: (f64, f64),
    ) -> Self {
        Self {
            key,
            label,
            unit,
            min: normal.0,
            max: normal.1,
            critical_min: critical.0,
            critical_max: critical.1,
        }
    }

    /// Classify one value
    #[must_use]
    pub fn evaluate(&self, value: f64) -> ReadingStatus {
        if !value.is_finite() || value < self.critical_min || value > self.critical_max {
            ReadingStatus::Critical
        } else if value < self.min || value > self.max {
            ReadingStatus::Warning
        } else {
            ReadingStatus::Ok
        }
    }
}

const POOL_FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("chlorine", "Chlorine", "ppm", (1.0, 3.0), (0.5, 5.0)),
    FieldSpec::new("ph", "pH", "", (7.2, 7.6), (6.8, 8.0)),
    FieldSpec::new("temperature", "Temperature", "°C", (26.0, 29.0), (20.0, 35.0)),
];

const BOILER_FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("pressure", "Pressure", "psi", (30.0, 50.0), (15.0, 70.0)),
    FieldSpec::new("outlet_temperature", "Outlet temperature", "°C", (55.0, 65.0), (45.0, 80.0)),
    FieldSpec::new("gas_level", "Gas level", "%", (20.0, 100.0), (10.0, 100.0)),
];

const ENERGY_FIELDS: [FieldSpec; 2] = [
    FieldSpec::new("meter_reading", "Meter reading", "kWh", (0.0, 999_999.0), (-1.0, 9_999_999.0)),
    FieldSpec::new("line_voltage", "Line voltage", "V", (110.0, 127.0), (100.0, 140.0)),
];

/// Fields recorded for a logbook kind
#[must_use]
pub const fn fields(kind: LogbookKind) -> &'static [FieldSpec] {
    match kind {
        LogbookKind::Pool => &POOL_FIELDS,
        LogbookKind::Boilers => &BOILER_FIELDS,
        LogbookKind::Energy => &ENERGY_FIELDS,
    }
}

/// Overall status of an entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingStatus {
    /// Every reading in the normal range
    Ok,
    /// Some reading outside the normal range
    Warning,
    /// Some reading outside the critical range
    Critical,
}

/// Worst status across the known fields present in `readings`
///
/// Keys that are not fields of `kind` are kept on the entry but not graded.
#[must_use]
pub fn evaluate(kind: LogbookKind, readings: &BTreeMap<String, f64>) -> ReadingStatus {
    fields(kind)
        .iter()
        .filter_map(|field| readings.get(field.key).map(|value| field.evaluate(*value)))
        .max()
        .unwrap_or(ReadingStatus::Ok)
}

/// Recorded utility log entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogbookEntry {
    /// `LOG-<n>`
    pub id: LogbookEntryId,
    /// When recorded
    pub at: DateTime<Utc>,
    /// Kind
    pub kind: LogbookKind,
    /// Readings by field key
    pub readings: BTreeMap<String, f64>,
    /// Recording role
    pub recorded_by: Role,
    /// Computed status
    pub status: ReadingStatus,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Data for a new log entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewLogbookEntry {
    /// Kind
    pub kind: LogbookKind,
    /// Readings by field key
    pub readings: BTreeMap<String, f64>,
    /// Free text
    pub notes: Option<String>,
}

impl NewLogbookEntry {
    /// Empty entry of `kind`
    #[must_use]
    pub const fn new(kind: LogbookKind) -> Self {
        Self {
            kind,
            readings: BTreeMap::new(),
            notes: None,
        }
    }

    /// Add a reading
    #[must_use]
    pub fn reading(mut self, key: impl Into<String>, value: f64) -> Self {
        self.readings.insert(key.into(), value);
        self
    }

    /// Attach notes
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
