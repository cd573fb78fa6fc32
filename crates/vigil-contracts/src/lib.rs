//! # vigil-contracts
//!
//! Shared types and error definitions for the VIGIL audit subsystem.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod entry;
pub mod error;
pub mod query;
pub mod risk;

pub use entry::{AuditEntry, ChangeSet, EventMetadata, EventResult, NewEntry};
pub use error::{VigilError, VigilResult};
pub use query::{EntryFilter, EntryPage, EventTypeCount, LedgerStats, StatsFilter, HIGH_RISK_FLOOR};
pub use risk::{FraudCheckRequest, RiskAssessment, TriggerAction, MAX_RISK_SCORE};

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use risk::cap_add;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build a fully-populated entry for serde round-trip checks.
    fn sample_entry() -> AuditEntry {
        AuditEntry {
            sequence: 7,
            timestamp: Utc::now(),
            event_type: "order.created".to_string(),
            user_id: Some("user-42".to_string()),
            action: "created".to_string(),
            resource: "order".to_string(),
            resource_id: Some("order-9".to_string()),
            changes: None,
            metadata: EventMetadata {
                ip: Some("203.0.113.7".to_string()),
                amount: Some(250.0),
                currency: Some("USD".to_string()),
                ..EventMetadata::default()
            },
            result: EventResult::Success,
            error_message: None,
            risk_score: Some(40),
            signature: "ab".repeat(32),
            previous_hash: Some("cd".repeat(32)),
        }
    }

    // ── Score arithmetic ──────────────────────────────────────────────────────

    #[test]
    fn cap_add_never_exceeds_ceiling() {
        assert_eq!(cap_add(60, 30), 90);
        assert_eq!(cap_add(70, 70), 100);
        assert_eq!(cap_add(100, 1), 100);
        assert_eq!(cap_add(0, 0), 0);
    }

    #[test]
    fn assessment_record_caps_and_collects_reasons() {
        let mut a = RiskAssessment::none();
        a.record(70, "short burst");
        a.record(50, "sustained volume");
        assert_eq!(a.risk_score, 100);
        assert_eq!(a.reasons.len(), 2);
        assert_eq!(a.reasons[0], "short burst");
    }

    #[test]
    fn assessment_record_at_least_is_a_floor_not_additive() {
        let mut a = RiskAssessment::none();
        a.record_at_least(40, "tier one");
        a.record_at_least(70, "tier two");
        a.record_at_least(50, "lower tier fires after");
        assert_eq!(a.risk_score, 70);
        assert_eq!(a.reasons.len(), 3);
    }

    #[test]
    fn assessment_finalized_applies_threshold() {
        let mut a = RiskAssessment::none();
        a.record(59, "almost");
        assert!(!a.clone().finalized(60).is_anomalous);
        a.record(1, "over the line");
        assert!(a.finalized(60).is_anomalous);
    }

    // ── Entry construction ────────────────────────────────────────────────────

    #[test]
    fn new_entry_derives_action_from_taxonomy_suffix() {
        let draft = NewEntry::new("auth.login", "authentication", EventResult::Success);
        assert_eq!(draft.action, "login");

        let flat = NewEntry::new("heartbeat", "system", EventResult::Success);
        assert_eq!(flat.action, "heartbeat");
    }

    // ── Serde round trips ─────────────────────────────────────────────────────

    #[test]
    fn audit_entry_round_trips_through_json() {
        let original = sample_entry();
        let json = serde_json::to_string(&original).unwrap();
        let decoded: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.sequence, original.sequence);
        assert_eq!(decoded.event_type, original.event_type);
        assert_eq!(decoded.signature, original.signature);
        assert_eq!(decoded.previous_hash, original.previous_hash);
        assert_eq!(decoded.risk_score, original.risk_score);
    }

    #[test]
    fn event_result_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EventResult::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&EventResult::Failure).unwrap(), "\"failure\"");
        assert_eq!(serde_json::to_string(&EventResult::Partial).unwrap(), "\"partial\"");
    }

    #[test]
    fn metadata_extra_keys_flatten() {
        let mut meta = EventMetadata::from_ip("198.51.100.1");
        meta.extra
            .insert("orderId".to_string(), serde_json::json!("o-1"));
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["ip"], "198.51.100.1");
        // Flattened: extra keys sit at the top level, not under "extra".
        assert_eq!(json["orderId"], "o-1");
    }

    // ── Filters ───────────────────────────────────────────────────────────────

    #[test]
    fn filter_min_risk_score_ignores_unscored_entries() {
        let mut entry = sample_entry();
        let filter = EntryFilter {
            min_risk_score: Some(30),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&entry));

        entry.risk_score = None;
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn filter_event_type_prefix_matches_the_taxonomy_family() {
        let entry = sample_entry();
        let filter = EntryFilter {
            event_type_prefix: Some("order.".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&entry));

        let other_family = EntryFilter {
            event_type_prefix: Some("payment.".to_string()),
            ..EntryFilter::default()
        };
        assert!(!other_family.matches(&entry));
    }

    #[test]
    fn filter_combines_predicates_conjunctively() {
        let entry = sample_entry();
        let filter = EntryFilter {
            event_type: Some("order.created".to_string()),
            user_id: Some("user-42".to_string()),
            result: Some(EventResult::Success),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&entry));

        let mismatched = EntryFilter {
            user_id: Some("someone-else".to_string()),
            ..filter
        };
        assert!(!mismatched.matches(&entry));
    }

    // ── Error display ─────────────────────────────────────────────────────────

    #[test]
    fn error_messages_carry_context() {
        let err = VigilError::AppendFailed {
            reason: "store unavailable".to_string(),
        };
        assert!(err.to_string().contains("append failed"));
        assert!(err.to_string().contains("store unavailable"));

        let err = VigilError::ImmutableEntry { sequence: 12 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("immutable"));
    }
}
