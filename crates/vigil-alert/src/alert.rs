//! Alert payload model and per-category constructors.
//!
//! An `Alert` is the rendered, human-facing form of a high-risk finding.
//! Each category carries its own canned remediation checklist so the
//! on-call reader never starts from a blank page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of incident the alert describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Fraud,
    HighRiskOrder,
    Security,
    System,
}

impl AlertCategory {
    pub fn label(self) -> &'static str {
        match self {
            AlertCategory::Fraud => "FRAUD",
            AlertCategory::HighRiskOrder => "HIGH RISK",
            AlertCategory::Security => "SECURITY",
            AlertCategory::System => "SYSTEM",
        }
    }
}

/// Alert severity bands.
///
/// The dispatcher drops `Low` entirely, logs `Medium` without sending, and
/// sends `High` and `Critical` out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Map a risk score onto the severity bands: ≥80 critical, ≥70 high,
    /// ≥30 medium, else low.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Severity::Critical,
            70..=79 => Severity::High,
            30..=69 => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// One outbound notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub category: AlertCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    /// Structured context rendered as a key/value table.
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    /// Remediation checklist appropriate to the category.
    pub recommendations: Vec<String>,
}

impl Alert {
    /// Fraudulent-activity alert for a scored fraud-check finding.
    pub fn fraud(
        user_id: impl Into<String>,
        reasons: &[String],
        risk_score: u8,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: AlertCategory::Fraud,
            severity: Severity::from_score(risk_score).max(Severity::High),
            title: "Fraud Detection Alert".to_string(),
            description: format!(
                "Fraudulent activity detected with risk score {}/100. {}",
                risk_score,
                reasons.join("; ")
            ),
            user_id: Some(user_id.into()),
            event_type: None,
            risk_score: Some(risk_score),
            metadata,
            timestamp: Utc::now(),
            recommendations: vec![
                "Review user account immediately".to_string(),
                "Check transaction history for patterns".to_string(),
                "Contact user to verify activity".to_string(),
                "Consider temporarily locking account".to_string(),
                "Monitor for additional suspicious activity".to_string(),
            ],
        }
    }

    /// Alert for an order flagged by the order detectors.
    pub fn high_risk_order(
        user_id: impl Into<String>,
        order_id: impl Into<String>,
        amount: f64,
        reasons: &[String],
        risk_score: u8,
    ) -> Self {
        let order_id = order_id.into();
        Self {
            id: Uuid::new_v4(),
            category: AlertCategory::HighRiskOrder,
            severity: Severity::from_score(risk_score).max(Severity::High),
            title: "High-Risk Order Detected".to_string(),
            description: format!(
                "Order {} flagged as high-risk. {}",
                order_id,
                reasons.join("; ")
            ),
            user_id: Some(user_id.into()),
            event_type: Some("order.created".to_string()),
            risk_score: Some(risk_score),
            metadata: serde_json::json!({
                "orderId": order_id,
                "amount": amount,
            }),
            timestamp: Utc::now(),
            recommendations: vec![
                "Hold order for manual review".to_string(),
                "Contact customer to verify order".to_string(),
                "Check shipping address history".to_string(),
                "Verify payment method".to_string(),
                "Review user's order history".to_string(),
            ],
        }
    }

    /// Brute-force alert for a failed-login pattern finding.
    pub fn failed_login(
        user_id: Option<String>,
        ip: impl Into<String>,
        attempt_count: usize,
        risk_score: u8,
    ) -> Self {
        let ip = ip.into();
        Self {
            id: Uuid::new_v4(),
            category: AlertCategory::Security,
            severity: Severity::from_score(risk_score).max(Severity::High),
            title: "Brute Force Attack Detected".to_string(),
            description: format!(
                "Multiple failed login attempts detected from IP {}. Potential brute force attack.",
                ip
            ),
            user_id,
            event_type: Some("security.failed_login".to_string()),
            risk_score: Some(risk_score),
            metadata: serde_json::json!({
                "ip": ip,
                "attemptCount": attempt_count,
                "attackType": "Brute Force",
            }),
            timestamp: Utc::now(),
            recommendations: vec![
                "Block IP address immediately".to_string(),
                "Enable CAPTCHA on login page".to_string(),
                "Notify affected user (if identified)".to_string(),
                "Review firewall rules".to_string(),
                "Monitor for distributed attack patterns".to_string(),
            ],
        }
    }

    /// Generic critical-event alert for a high-risk ledger entry whose
    /// category is inferred from the event-type prefix.
    pub fn critical_event(
        category: AlertCategory,
        event_type: impl Into<String>,
        action: &str,
        resource: &str,
        user_id: Option<String>,
        risk_score: u8,
        metadata: serde_json::Value,
    ) -> Self {
        let event_type = event_type.into();
        Self {
            id: Uuid::new_v4(),
            category,
            severity: Severity::Critical,
            title: format!("Critical Event: {}", event_type),
            description: format!(
                "High-risk event detected (score: {}/100). {} on {}.",
                risk_score, action, resource
            ),
            user_id,
            event_type: Some(event_type),
            risk_score: Some(risk_score),
            metadata,
            timestamp: Utc::now(),
            recommendations: vec![
                "Review event details immediately".to_string(),
                "Verify user identity and activity".to_string(),
                "Check for related suspicious events".to_string(),
                "Consider account restrictions if needed".to_string(),
            ],
        }
    }

    /// Operational alert with caller-chosen severity.
    pub fn system(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: AlertCategory::System,
            severity,
            title: title.into(),
            description: description.into(),
            user_id: None,
            event_type: None,
            risk_score: None,
            metadata,
            timestamp: Utc::now(),
            recommendations: vec![
                "Review event details immediately".to_string(),
                "Check for related suspicious events".to_string(),
            ],
        }
    }

    /// Render the plain-text notification body.
    pub fn render_text(&self) -> String {
        let mut text = format!(
            "===========================================\n\
             SECURITY ALERT - {}\n\
             ===========================================\n\
             \n\
             Alert Type: {}\n\
             Title: {}\n\
             Severity: {}\n\
             Timestamp: {}\n\
             \n\
             Description:\n\
             {}\n",
            self.severity.label(),
            self.category.label(),
            self.title,
            self.severity.label(),
            self.timestamp.to_rfc3339(),
            self.description,
        );

        if let Some(ref user_id) = self.user_id {
            text.push_str(&format!("\nUser ID: {}", user_id));
        }
        if let Some(ref event_type) = self.event_type {
            text.push_str(&format!("\nEvent Type: {}", event_type));
        }
        if let Some(score) = self.risk_score {
            text.push_str(&format!("\nRisk Score: {}/100", score));
        }

        if let Some(map) = self.metadata.as_object() {
            if !map.is_empty() {
                text.push_str("\n\nAdditional Information:");
                for (key, value) in map {
                    text.push_str(&format!("\n  - {}: {}", key, value));
                }
            }
        }

        if !self.recommendations.is_empty() {
            text.push_str("\n\nRecommended Actions:");
            for (i, rec) in self.recommendations.iter().enumerate() {
                text.push_str(&format!("\n  {}. {}", i + 1, rec));
            }
        }

        text.push_str("\n\n===========================================");
        text.push_str("\nThis is an automated security alert.");
        text
    }
}
