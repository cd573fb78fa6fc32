//! # vigil-detect
//!
//! Rule-based behavioral anomaly detectors.
//!
//! Each detector is a pure function of (subject identity, recent history,
//! proposed action parameters) → [`RiskAssessment`](vigil_contracts::RiskAssessment).
//! Fetching the history slices is the orchestrator's job (vigil-fraud);
//! nothing in this crate performs I/O, which keeps every rule unit-testable
//! against hand-built fixtures.
//!
//! All detectors share the same shape: evaluate rules, accumulate
//! `(risk_score, reasons)`, then report `is_anomalous` against the shared
//! threshold from [`DetectorConfig`]. Missing history is insufficient
//! data, never an anomaly.

pub mod config;
pub mod high_value;
pub mod history;
pub mod login;
pub mod payment;
pub mod velocity;

pub use config::DetectorConfig;
pub use high_value::detect_high_value_order;
pub use history::{LoginAttempt, OrderRecord, PaymentRecord};
pub use login::detect_failed_login_pattern;
pub use payment::detect_payment_fraud;
pub use velocity::detect_rapid_order_creation;
