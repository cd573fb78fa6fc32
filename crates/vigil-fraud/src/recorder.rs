//! Business-event recording: the `log_*_event` entry points the
//! application layer calls after every notable action.
//!
//! Each helper builds a draft entry with a baseline risk score for its
//! category, appends it best-effort (the caller's transaction never fails
//! because auditing did), and runs the high-risk hook: score ≥ 70 logs a
//! structured warning, score ≥ 80 additionally dispatches a critical
//! alert, fire-and-forget.

use std::sync::Arc;

use tracing::warn;

use vigil_alert::{Alert, AlertCategory, AlertDispatcher};
use vigil_contracts::{
    entry::{AuditEntry, ChangeSet, EventMetadata, EventResult, NewEntry},
    query::HIGH_RISK_FLOOR,
    risk::cap_add,
};
use vigil_ledger::InMemoryLedger;

/// Score at which the high-risk hook escalates from a warning to an alert.
const CRITICAL_ALERT_FLOOR: u8 = 80;

/// Authentication event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    Login,
    Logout,
    Register,
    PasswordReset,
    EmailVerify,
    TwoFactorEnable,
    TwoFactorDisable,
}

impl AuthEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthEvent::Login => "auth.login",
            AuthEvent::Logout => "auth.logout",
            AuthEvent::Register => "auth.register",
            AuthEvent::PasswordReset => "auth.password_reset",
            AuthEvent::EmailVerify => "auth.email_verify",
            AuthEvent::TwoFactorEnable => "auth.2fa_enable",
            AuthEvent::TwoFactorDisable => "auth.2fa_disable",
        }
    }
}

/// Payment event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEvent {
    Initiated,
    Completed,
    Failed,
    Refunded,
}

impl PaymentEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentEvent::Initiated => "payment.initiated",
            PaymentEvent::Completed => "payment.completed",
            PaymentEvent::Failed => "payment.failed",
            PaymentEvent::Refunded => "payment.refunded",
        }
    }
}

/// Order event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    Created,
    Updated,
    Cancelled,
    Shipped,
}

impl OrderEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderEvent::Created => "order.created",
            OrderEvent::Updated => "order.updated",
            OrderEvent::Cancelled => "order.cancelled",
            OrderEvent::Shipped => "order.shipped",
        }
    }
}

/// User-profile event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    ProfileUpdate,
    AddressChange,
    RoleChange,
    AccountLocked,
}

impl UserEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            UserEvent::ProfileUpdate => "user.profile_update",
            UserEvent::AddressChange => "user.address_change",
            UserEvent::RoleChange => "user.role_change",
            UserEvent::AccountLocked => "user.account_locked",
        }
    }
}

/// Security event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    FailedLogin,
    RateLimitExceeded,
    SuspiciousActivity,
    FraudDetected,
}

impl SecurityEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityEvent::FailedLogin => "security.failed_login",
            SecurityEvent::RateLimitExceeded => "security.rate_limit_exceeded",
            SecurityEvent::SuspiciousActivity => "security.suspicious_activity",
            SecurityEvent::FraudDetected => "security.fraud_detected",
        }
    }
}

/// The write-side facade the application layer talks to.
pub struct EventRecorder {
    ledger: Arc<InMemoryLedger>,
    dispatcher: Arc<AlertDispatcher>,
}

impl EventRecorder {
    pub fn new(ledger: Arc<InMemoryLedger>, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self { ledger, dispatcher }
    }

    /// Record an authentication event. Failed attempts carry a baseline
    /// risk of 50.
    pub fn log_auth_event(
        &self,
        event: AuthEvent,
        user_id: Option<String>,
        metadata: EventMetadata,
        result: EventResult,
        error_message: Option<String>,
    ) -> Option<AuditEntry> {
        let mut draft = NewEntry::new(event.as_str(), "authentication", result);
        draft.user_id = user_id;
        draft.metadata = metadata;
        draft.error_message = error_message;
        draft.risk_score = (result == EventResult::Failure).then_some(50);
        self.record(draft)
    }

    /// Record a payment event. Baseline risk tiers on the amount (+30
    /// over $1,000, +20 over $5,000) and +25 on failure.
    pub fn log_payment_event(
        &self,
        event: PaymentEvent,
        user_id: impl Into<String>,
        order_id: impl Into<String>,
        metadata: EventMetadata,
        result: EventResult,
        error_message: Option<String>,
    ) -> Option<AuditEntry> {
        let mut score = 0u8;
        if let Some(amount) = metadata.amount {
            if amount > 1_000.0 {
                score = cap_add(score, 30);
            }
            if amount > 5_000.0 {
                score = cap_add(score, 20);
            }
        }
        if result == EventResult::Failure {
            score = cap_add(score, 25);
        }

        let mut draft = NewEntry::new(event.as_str(), "payment", result);
        draft.user_id = Some(user_id.into());
        draft.resource_id = Some(order_id.into());
        draft.metadata = metadata;
        draft.error_message = error_message;
        draft.risk_score = (score > 0).then_some(score);
        self.record(draft)
    }

    /// Record an order event. A shipping-address change in the snapshot
    /// scores 60; totals over $10,000 add 30. A caller-supplied fraud
    /// score (from `perform_fraud_check`) overrides the baseline when
    /// it is higher.
    pub fn log_order_event(
        &self,
        event: OrderEvent,
        user_id: impl Into<String>,
        order_id: impl Into<String>,
        changes: Option<ChangeSet>,
        metadata: EventMetadata,
        result: EventResult,
        fraud_score: Option<u8>,
    ) -> Option<AuditEntry> {
        let mut score = 0u8;
        if let Some(ref cs) = changes {
            if shipping_address_changed(cs) {
                score = 60;
            }
        }
        if metadata.amount.is_some_and(|a| a > 10_000.0) {
            score = cap_add(score, 30);
        }
        let score = score.max(fraud_score.unwrap_or(0));

        let mut draft = NewEntry::new(event.as_str(), "order", result);
        draft.user_id = Some(user_id.into());
        draft.resource_id = Some(order_id.into());
        draft.changes = changes;
        draft.metadata = metadata;
        draft.risk_score = (score > 0).then_some(score);
        self.record(draft)
    }

    /// Record a user-profile event. Address changes are moderate risk
    /// (40); role changes are high risk (80).
    pub fn log_user_event(
        &self,
        event: UserEvent,
        user_id: impl Into<String>,
        changes: Option<ChangeSet>,
        metadata: EventMetadata,
        result: EventResult,
    ) -> Option<AuditEntry> {
        let score = match event {
            UserEvent::AddressChange => Some(40),
            UserEvent::RoleChange => Some(80),
            _ => None,
        };

        let user_id = user_id.into();
        let mut draft = NewEntry::new(event.as_str(), "user", result);
        draft.user_id = Some(user_id.clone());
        draft.resource_id = Some(user_id);
        draft.changes = changes;
        draft.metadata = metadata;
        draft.risk_score = score;
        self.record(draft)
    }

    /// Record a security event. Always a failure; the metadata `reason`
    /// doubles as the error message; risk defaults to 70.
    pub fn log_security_event(
        &self,
        event: SecurityEvent,
        user_id: Option<String>,
        metadata: EventMetadata,
        risk_score: Option<u8>,
    ) -> Option<AuditEntry> {
        let mut draft = NewEntry::new(event.as_str(), "security", EventResult::Failure);
        draft.user_id = user_id;
        draft.error_message = metadata.reason.clone();
        draft.metadata = metadata;
        draft.risk_score = Some(risk_score.unwrap_or(70));
        self.record(draft)
    }

    /// Append best-effort, then run the high-risk hook on the stored entry.
    fn record(&self, draft: NewEntry) -> Option<AuditEntry> {
        let entry = self.ledger.record(draft)?;

        if let Some(score) = entry.risk_score {
            if score >= HIGH_RISK_FLOOR {
                warn!(
                    event_type = %entry.event_type,
                    user_id = ?entry.user_id,
                    risk_score = score,
                    action = %entry.action,
                    "high-risk event logged"
                );
            }
            if score >= CRITICAL_ALERT_FLOOR {
                let alert = Alert::critical_event(
                    category_for(&entry.event_type),
                    entry.event_type.clone(),
                    &entry.action,
                    &entry.resource,
                    entry.user_id.clone(),
                    score,
                    serde_json::to_value(&entry.metadata).unwrap_or_default(),
                );
                // Fire-and-forget: the delivery thread outlives this call.
                drop(self.dispatcher.dispatch(alert));
            }
        }

        Some(entry)
    }
}

/// Choose the alert category from the event-type prefix.
fn category_for(event_type: &str) -> AlertCategory {
    if event_type.starts_with("payment") {
        AlertCategory::Fraud
    } else if event_type.starts_with("security") {
        AlertCategory::Security
    } else {
        AlertCategory::HighRiskOrder
    }
}

/// True when the before/after snapshot shows a shipping-address change.
fn shipping_address_changed(changes: &ChangeSet) -> bool {
    let before = changes
        .before
        .as_ref()
        .and_then(|v| v.get("shipping_address"));
    let after = changes
        .after
        .as_ref()
        .and_then(|v| v.get("shipping_address"));
    matches!((before, after), (Some(b), Some(a)) if b != a)
}
