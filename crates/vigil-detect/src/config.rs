//! Detector thresholds, loadable from TOML.
//!
//! Every rule constant the detectors and the orchestrator consult lives
//! here, so deployments tune behavior through configuration instead of a
//! rebuild. `DetectorConfig::default()` carries the production defaults;
//! a TOML document may override any subset of fields.
//!
//! ```toml
//! anomalous_threshold = 60
//! compound_min_signals = 2
//! first_order_high_value = 1000.0
//! absolute_order_ceiling = 10000.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use vigil_contracts::error::{VigilError, VigilResult};

/// Thresholds for all four detectors plus the aggregate policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Score at or above which a single assessment is anomalous.
    pub anomalous_threshold: u8,
    /// How many independently-anomalous detectors make the aggregate
    /// anomalous even when no single score crosses the threshold.
    pub compound_min_signals: usize,

    // ── High-value order detector ─────────────────────────────────────────
    /// A first-ever order above this amount is suspicious on its own.
    pub first_order_high_value: f64,
    /// Any order above this amount is flagged regardless of history.
    pub absolute_order_ceiling: f64,
    /// Multiple of the historical average at which an order is flagged.
    pub average_multiple: f64,

    // ── Rapid order creation detector ─────────────────────────────────────
    /// Strictly more orders than this within one hour fires the burst rule.
    pub hourly_order_limit: usize,
    /// Strictly more orders than this within 24 hours fires the volume rule.
    pub daily_order_limit: usize,

    // ── Failed login pattern detector ─────────────────────────────────────
    /// Failed attempts (per user or per IP) at or above this count fire.
    pub failed_login_threshold: usize,
    /// Lookback window for counting failed logins, in minutes.
    pub failed_login_window_minutes: i64,
    /// Minimum attempts from one IP before timing analysis is meaningful.
    pub automation_min_attempts: usize,

    // ── Payment fraud detector ────────────────────────────────────────────
    /// Strictly more payment attempts than this within one hour fire.
    pub hourly_payment_limit: usize,
    /// Distinct payment IPs (including the current one) at or above this
    /// count within 24 hours fire.
    pub distinct_ip_threshold: usize,
    /// Failure fraction (0–1) at or above which the failure-rate rule fires.
    pub failure_rate_threshold: f64,
    /// Minimum payment events before the failure rate is trusted.
    pub failure_rate_min_samples: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            anomalous_threshold: 60,
            compound_min_signals: 2,
            first_order_high_value: 1_000.0,
            absolute_order_ceiling: 10_000.0,
            average_multiple: 3.0,
            hourly_order_limit: 5,
            daily_order_limit: 20,
            failed_login_threshold: 10,
            failed_login_window_minutes: 15,
            automation_min_attempts: 5,
            hourly_payment_limit: 4,
            distinct_ip_threshold: 4,
            failure_rate_threshold: 0.7,
            failure_rate_min_samples: 5,
        }
    }
}

impl DetectorConfig {
    /// Parse `s` as a TOML override document.
    ///
    /// Returns `VigilError::ConfigError` if the TOML is malformed or a
    /// field has the wrong type.
    pub fn from_toml_str(s: &str) -> VigilResult<Self> {
        toml::from_str(s).map_err(|e| VigilError::ConfigError {
            reason: format!("failed to parse detector config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as a TOML override document.
    pub fn from_file(path: &Path) -> VigilResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| VigilError::ConfigError {
            reason: format!(
                "failed to read detector config '{}': {}",
                path.display(),
                e
            ),
        })?;
        Self::from_toml_str(&contents)
    }
}
