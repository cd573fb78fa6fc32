//! Audit entry types.
//!
//! `NewEntry` is what the business layer hands to the ledger; `AuditEntry`
//! is the immutable, signed, chained record the ledger stores. The ledger
//! alone assigns `sequence`, `timestamp`, `signature`, and `previous_hash` —
//! callers never supply them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the business action an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventResult {
    Success,
    Failure,
    Partial,
}

/// Before/after snapshot pair for mutation events.
///
/// Both sides are free-form JSON; the recorder stores only the fields that
/// actually changed (e.g. `{"status": "pending"}` → `{"status": "shipped"}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}

/// Structured metadata attached to an entry.
///
/// Named fields cover what the recorder and detectors actually read; the
/// flattened `extra` map keeps the bag open for forward compatibility.
/// Never store secrets in cleartext here — this struct is persisted and
/// rendered into alerts verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Free-text reason for security events (rate limits, lockouts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_count: Option<u32>,
    /// Identity of the admin who performed a change on another user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    /// Open extension point for event-specific keys.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventMetadata {
    /// Metadata carrying only a source IP — the common case for
    /// authentication and security events.
    pub fn from_ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            ..Self::default()
        }
    }
}

/// A caller-supplied draft entry, before the ledger signs and chains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    /// Dotted taxonomy string, e.g. `auth.login`, `order.created`,
    /// `security.failed_login`, `payment.failed`.
    pub event_type: String,
    /// Acting principal; absent for anonymous or pre-auth events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// What was done (usually the taxonomy suffix, e.g. `created`).
    pub action: String,
    /// The kind of object acted on, e.g. `order`, `payment`, `security`.
    pub resource: String,
    /// The specific instance, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,
    #[serde(default)]
    pub metadata: EventMetadata,
    pub result: EventResult,
    /// Present only when `result` is not `Success`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// 0–100; present only when a detector scored this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
}

impl NewEntry {
    /// Minimal draft for the given taxonomy string. The action defaults to
    /// the suffix after the first `.` (the whole string when there is none).
    pub fn new(
        event_type: impl Into<String>,
        resource: impl Into<String>,
        result: EventResult,
    ) -> Self {
        let event_type = event_type.into();
        let action = event_type
            .split_once('.')
            .map(|(_, suffix)| suffix.to_string())
            .unwrap_or_else(|| event_type.clone());
        Self {
            event_type,
            user_id: None,
            action,
            resource: resource.into(),
            resource_id: None,
            changes: None,
            metadata: EventMetadata::default(),
            result,
            error_message: None,
            risk_score: None,
        }
    }
}

/// One immutable record in the signed, hash-chained ledger.
///
/// Only the ledger constructs these. Modifying any field after append —
/// including those of the embedded metadata — invalidates the stored
/// signature and every subsequent `previous_hash`, which chain verification
/// detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in append order, starting at 0. This — not the wall-clock
    /// timestamp — is the ordering the chain is built and verified over.
    pub sequence: u64,
    /// Wall-clock time (UTC) the ledger created this entry.
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub action: String,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,
    #[serde(default)]
    pub metadata: EventMetadata,
    pub result: EventResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    /// Hex-encoded HMAC-SHA256 over the entry's canonical fields.
    pub signature: String,
    /// SHA-256 of the previous entry's `signature` + ISO-8601 timestamp,
    /// or `None` for the first entry ever appended.
    pub previous_hash: Option<String>,
}
