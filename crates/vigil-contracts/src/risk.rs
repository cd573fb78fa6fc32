//! Risk assessment types shared by the detectors and the orchestrator.
//!
//! A `RiskAssessment` is transient — it is never persisted directly. The
//! aggregate score is folded into the triggering `AuditEntry`'s
//! `risk_score` field and the reasons into its metadata.

use serde::{Deserialize, Serialize};

/// Hard ceiling on every risk score in the system.
pub const MAX_RISK_SCORE: u8 = 100;

/// Add two score contributions, capped at [`MAX_RISK_SCORE`].
pub fn cap_add(a: u8, b: u8) -> u8 {
    a.saturating_add(b).min(MAX_RISK_SCORE)
}

/// The output of one detector (or the orchestrator's aggregate).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Did this dimension cross its concern threshold.
    pub is_anomalous: bool,
    /// 0–100 contribution from this dimension.
    pub risk_score: u8,
    /// Human-readable justifications, one per rule that fired, in the
    /// order the rules were evaluated.
    pub reasons: Vec<String>,
}

impl RiskAssessment {
    /// An empty, non-anomalous assessment — the starting point for every
    /// detector and the correct answer for "insufficient data".
    pub fn none() -> Self {
        Self::default()
    }

    /// Record a fired rule: add its contribution (capped at 100) and its
    /// justification.
    pub fn record(&mut self, points: u8, reason: impl Into<String>) {
        self.risk_score = cap_add(self.risk_score, points);
        self.reasons.push(reason.into());
    }

    /// Raise the score to at least `floor` (used where rules are severity
    /// tiers of the same concern rather than independent signals).
    pub fn record_at_least(&mut self, floor: u8, reason: impl Into<String>) {
        self.risk_score = self.risk_score.max(floor.min(MAX_RISK_SCORE));
        self.reasons.push(reason.into());
    }

    /// Set `is_anomalous` from the accumulated score and return self.
    pub fn finalized(mut self, anomalous_threshold: u8) -> Self {
        self.is_anomalous = self.risk_score >= anomalous_threshold;
        self
    }
}

/// Which business action triggered a fraud check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerAction {
    /// Order creation: runs the high-value and rapid-creation detectors.
    Order,
    /// Payment initiation: runs the payment-fraud detector.
    Payment,
    /// Login attempt: runs the failed-login-pattern detector.
    Login,
}

/// Everything the orchestrator needs to score one business action.
///
/// `user_id` may be absent for anonymous login attempts — the login
/// detector then falls back to the IP-only signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudCheckRequest {
    pub action: TriggerAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Proposed order or payment amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl FraudCheckRequest {
    /// A check for an order about to be created.
    pub fn order(user_id: impl Into<String>, amount: f64, shipping_address: Option<String>) -> Self {
        Self {
            action: TriggerAction::Order,
            user_id: Some(user_id.into()),
            amount: Some(amount),
            shipping_address,
            ip: None,
        }
    }

    /// A check for a payment about to be initiated.
    pub fn payment(user_id: impl Into<String>, amount: f64, ip: Option<String>) -> Self {
        Self {
            action: TriggerAction::Payment,
            user_id: Some(user_id.into()),
            amount: Some(amount),
            shipping_address: None,
            ip,
        }
    }

    /// A check for a login attempt. `user_id` is `None` when the target
    /// account could not be resolved.
    pub fn login(user_id: Option<String>, ip: impl Into<String>) -> Self {
        Self {
            action: TriggerAction::Login,
            user_id,
            amount: None,
            shipping_address: None,
            ip: Some(ip.into()),
        }
    }
}
