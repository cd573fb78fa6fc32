//! History record types the detectors consume.
//!
//! Detectors are pure functions over these slices; fetching them (from the
//! order store and the audit ledger) is the orchestrator's job. The
//! `from_entry` constructors translate ledger entries into the narrow view
//! a detector needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vigil_contracts::entry::{AuditEntry, EventResult};

/// One past order from the user's purchase history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub user_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(
        user_id: impl Into<String>,
        amount: f64,
        shipping_address: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            user_id: user_id.into(),
            amount,
            shipping_address,
            created_at,
        }
    }
}

/// One failed login attempt, as seen by the login-pattern detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// Target account, when it could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LoginAttempt {
    /// Project a `security.failed_login` ledger entry down to the fields
    /// the detector reads.
    pub fn from_entry(entry: &AuditEntry) -> Self {
        Self {
            user_id: entry.user_id.clone(),
            ip: entry.metadata.ip.clone(),
            timestamp: entry.timestamp,
        }
    }
}

/// One payment event from the user's recent payment history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub succeeded: bool,
    pub timestamp: DateTime<Utc>,
}

impl PaymentRecord {
    /// Project a `payment.*` ledger entry down to the fields the detector
    /// reads. Entries without a user id are not payment events VIGIL
    /// attributes to anyone and yield `None`.
    pub fn from_entry(entry: &AuditEntry) -> Option<Self> {
        Some(Self {
            user_id: entry.user_id.clone()?,
            amount: entry.metadata.amount,
            ip: entry.metadata.ip.clone(),
            succeeded: entry.result == EventResult::Success,
            timestamp: entry.timestamp,
        })
    }
}
