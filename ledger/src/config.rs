//! Ledger configuration.
//!
//! Loaded from `HOTEL_OPS_*` environment variables. Every setting has a
//! default, so an empty environment yields a working in-memory demo.
//!
//! # Example
//!
//! ```
//! use hotel_ops_ledger::config::LedgerConfig;
//!
//! let config = LedgerConfig::from_lookup(|key| match key {
//!     "HOTEL_OPS_DEFAULT_ETA_DAYS" => Some("5".to_string()),
//!     _ => None,
//! });
//! assert_eq!(config.default_eta_days, 5);
//! assert_eq!(config.storage_namespace, "hotel_ops");
//! ```

use crate::priority::{DEFAULT_FLAME_THRESHOLD, MAX_SCORE};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Ledger settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Directory for the JSON document store; no persistence when absent
    pub data_dir: Option<PathBuf>,
    /// Prefix of every persisted key
    pub storage_namespace: String,
    /// ETA for purchase orders when neither the request nor the part sets one
    pub default_eta_days: u32,
    /// Reorder target as a multiple of `min_stock`
    pub reorder_target_factor: u32,
    /// Pause before a purchase order receipt is applied
    pub po_receipt_delay: Duration,
    /// Scores above this are in the flame tier
    pub flame_threshold: u8,
    /// Vendor used when neither the request nor the part names one
    pub vendor_placeholder: String,
}

impl LedgerConfig {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: lookup("HOTEL_OPS_DATA_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            storage_namespace: lookup("HOTEL_OPS_STORAGE_NAMESPACE")
                .unwrap_or(defaults.storage_namespace),
            default_eta_days: lookup("HOTEL_OPS_DEFAULT_ETA_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_eta_days),
            reorder_target_factor: lookup("HOTEL_OPS_REORDER_TARGET_FACTOR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reorder_target_factor),
            po_receipt_delay: lookup("HOTEL_OPS_PO_RECEIPT_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.po_receipt_delay, Duration::from_millis),
            flame_threshold: lookup("HOTEL_OPS_FLAME_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.flame_threshold),
            vendor_placeholder: lookup("HOTEL_OPS_VENDOR_PLACEHOLDER")
                .unwrap_or(defaults.vendor_placeholder),
        }
    }

    /// Set the document store directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the persisted key prefix
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = namespace.into();
        self
    }

    /// Set the purchase order receipt delay
    #[must_use]
    pub const fn with_po_receipt_delay(mut self, delay: Duration) -> Self {
        self.po_receipt_delay = delay;
        self
    }

    /// Validate the settings
    ///
    /// # Errors
    ///
    /// Returns error if any setting is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_namespace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage_namespace cannot be empty".to_string(),
            ));
        }
        if self.reorder_target_factor == 0 {
            return Err(ConfigError::ValidationError(
                "reorder_target_factor must be > 0".to_string(),
            ));
        }
        if self.flame_threshold > MAX_SCORE {
            return Err(ConfigError::ValidationError(format!(
                "flame_threshold must be <= {MAX_SCORE}"
            )));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_namespace: "hotel_ops".to_string(),
            default_eta_days: 3,
            reorder_target_factor: 2,
            po_receipt_delay: Duration::ZERO,
            flame_threshold: DEFAULT_FLAME_THRESHOLD,
            vendor_placeholder: "Vendor (demo)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = LedgerConfig::from_lookup(|_| None);
        assert_eq!(config, LedgerConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = LedgerConfig::from_lookup(lookup_from(&[
            ("HOTEL_OPS_DATA_DIR", "/tmp/hotel"),
            ("HOTEL_OPS_STORAGE_NAMESPACE", "demo"),
            ("HOTEL_OPS_PO_RECEIPT_DELAY_MS", "400"),
            ("HOTEL_OPS_FLAME_THRESHOLD", "70"),
        ]));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/hotel")));
        assert_eq!(config.storage_namespace, "demo");
        assert_eq!(config.po_receipt_delay, Duration::from_millis(400));
        assert_eq!(config.flame_threshold, 70);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = LedgerConfig::from_lookup(lookup_from(&[
            ("HOTEL_OPS_DEFAULT_ETA_DAYS", "soon"),
            ("HOTEL_OPS_DATA_DIR", "  "),
        ]));
        assert_eq!(config.default_eta_days, 3);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let config = LedgerConfig {
            flame_threshold: 120,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LedgerConfig::default().with_namespace(" ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
