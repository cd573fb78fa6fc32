//! VIGIL fraud layer: the orchestrator that runs detectors over fetched
//! history, and the event recorder the application layer writes through.
//!
//! The split mirrors the data flow. [`FraudEngine`] is the read side: it
//! answers "how risky is this action right now" by pulling history and
//! running the `vigil-detect` rules. [`EventRecorder`] is the write side:
//! it turns business events into signed ledger entries with baseline risk
//! scores, and escalates the worst of them into alerts.

pub mod engine;
pub mod recorder;

pub use engine::{combine_assessments, FraudEngine, InMemoryOrderStore, OrderStore};
pub use recorder::{
    AuthEvent, EventRecorder, OrderEvent, PaymentEvent, SecurityEvent, UserEvent,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};

    use vigil_alert::{AlertDispatcher, MemorySink, Severity};
    use vigil_contracts::{
        entry::{ChangeSet, EventMetadata, EventResult, NewEntry},
        risk::{FraudCheckRequest, RiskAssessment},
    };
    use vigil_detect::{config::DetectorConfig, history::OrderRecord};
    use vigil_ledger::{InMemoryLedger, SigningKey};

    use super::*;

    fn ledger() -> Arc<InMemoryLedger> {
        let key = SigningKey::new(*b"an-adequately-long-test-key!!").unwrap();
        Arc::new(InMemoryLedger::new(key))
    }

    fn engine_with(
        ledger: Arc<InMemoryLedger>,
        orders: Arc<InMemoryOrderStore>,
    ) -> FraudEngine {
        FraudEngine::new(DetectorConfig::default(), ledger, orders)
    }

    fn recorder_with_sink() -> (EventRecorder, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Arc::new(AlertDispatcher::new(sink.clone()));
        (EventRecorder::new(ledger(), dispatcher), sink)
    }

    /// Delivery happens on a detached thread; poll briefly instead of
    /// sleeping a fixed interval.
    fn wait_for_alerts(sink: &MemorySink, count: usize) -> Vec<vigil_alert::Alert> {
        for _ in 0..200 {
            let sent = sink.sent();
            if sent.len() >= count {
                return sent;
            }
            std::thread::sleep(StdDuration::from_millis(5));
        }
        sink.sent()
    }

    fn seed_payment(
        ledger: &InMemoryLedger,
        user: &str,
        ip: &str,
        result: EventResult,
        amount: f64,
    ) {
        let event = match result {
            EventResult::Success => "payment.completed",
            _ => "payment.failed",
        };
        let mut draft = NewEntry::new(event, "payment", result);
        draft.user_id = Some(user.to_string());
        draft.metadata.ip = Some(ip.to_string());
        draft.metadata.amount = Some(amount);
        ledger.record(draft).unwrap();
    }

    fn seed_failed_login(ledger: &InMemoryLedger, user: Option<&str>, ip: &str) {
        let mut draft = NewEntry::new("security.failed_login", "security", EventResult::Failure);
        draft.user_id = user.map(str::to_string);
        draft.metadata.ip = Some(ip.to_string());
        ledger.record(draft).unwrap();
    }

    // ── engine: order checks ──

    #[test]
    fn order_far_above_average_is_flagged() {
        let orders = Arc::new(InMemoryOrderStore::new());
        for i in 0..5 {
            orders.add(OrderRecord::new(
                "user-1",
                100.0,
                Some("1 Main St".to_string()),
                Utc::now() - Duration::days(10 + i),
            ));
        }
        let engine = engine_with(ledger(), orders);

        let request =
            FraudCheckRequest::order("user-1", 500.0, Some("1 Main St".to_string()));
        let assessment = engine.perform_fraud_check(&request).unwrap();

        assert!(assessment.risk_score >= 40);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r.contains("5x higher than average")));
    }

    #[test]
    fn order_without_principal_scores_zero() {
        let engine = engine_with(ledger(), Arc::new(InMemoryOrderStore::new()));
        let mut request = FraudCheckRequest::order("user-1", 50_000.0, None);
        request.user_id = None;

        let assessment = engine.perform_fraud_check(&request).unwrap();
        assert_eq!(assessment.risk_score, 0);
        assert!(!assessment.is_anomalous);
    }

    #[test]
    fn burst_of_orders_trips_velocity() {
        let orders = Arc::new(InMemoryOrderStore::new());
        for i in 0..6 {
            orders.add(OrderRecord::new(
                "user-2",
                20.0,
                None,
                Utc::now() - Duration::minutes(i * 5),
            ));
        }
        let engine = engine_with(ledger(), orders);

        let request = FraudCheckRequest::order("user-2", 20.0, None);
        let assessment = engine.perform_fraud_check(&request).unwrap();

        assert!(assessment.is_anomalous);
        assert!(assessment.risk_score >= 70);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r.contains("orders created in the last hour")));
    }

    // ── engine: payment checks ──

    #[test]
    fn repeated_failed_payments_are_flagged() {
        let ledger = ledger();
        for _ in 0..5 {
            seed_payment(&ledger, "user-3", "10.0.0.1", EventResult::Failure, 25.0);
        }
        seed_payment(&ledger, "user-3", "10.0.0.1", EventResult::Success, 25.0);
        let engine = engine_with(ledger, Arc::new(InMemoryOrderStore::new()));

        let request =
            FraudCheckRequest::payment("user-3", 25.0, Some("10.0.0.1".to_string()));
        let assessment = engine.perform_fraud_check(&request).unwrap();

        // Six attempts in the hour plus an 83% failure rate.
        assert!(assessment.is_anomalous);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r.contains("payment attempts in the last hour")));
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r.contains("payment failure rate")));
    }

    #[test]
    fn payments_from_other_users_do_not_count() {
        let ledger = ledger();
        for _ in 0..8 {
            seed_payment(&ledger, "someone-else", "10.0.0.9", EventResult::Failure, 25.0);
        }
        let engine = engine_with(ledger, Arc::new(InMemoryOrderStore::new()));

        let request = FraudCheckRequest::payment("user-4", 25.0, None);
        let assessment = engine.perform_fraud_check(&request).unwrap();
        assert_eq!(assessment.risk_score, 0);
    }

    // ── engine: login checks ──

    #[test]
    fn brute_force_against_one_account_is_flagged() {
        let ledger = ledger();
        for _ in 0..10 {
            seed_failed_login(&ledger, Some("victim"), "203.0.113.7");
        }
        let engine = engine_with(ledger, Arc::new(InMemoryOrderStore::new()));

        let request =
            FraudCheckRequest::login(Some("victim".to_string()), "203.0.113.99");
        let assessment = engine.perform_fraud_check(&request).unwrap();

        assert!(assessment.is_anomalous);
        assert!(assessment.risk_score >= 60);
    }

    #[test]
    fn credential_stuffing_from_one_ip_is_flagged() {
        let ledger = ledger();
        for i in 0..10 {
            let user = format!("target-{}", i);
            seed_failed_login(&ledger, Some(user.as_str()), "198.51.100.4");
        }
        let engine = engine_with(ledger, Arc::new(InMemoryOrderStore::new()));

        // Unknown user, familiar IP: only the per-IP rule can fire.
        let request = FraudCheckRequest::login(None, "198.51.100.4");
        let assessment = engine.perform_fraud_check(&request).unwrap();

        assert!(assessment.is_anomalous);
        assert!(assessment.risk_score >= 70);
    }

    // ── aggregation ──

    #[test]
    fn headline_score_is_the_maximum() {
        let cfg = DetectorConfig::default();
        let mut a = RiskAssessment::none();
        a.record(40, "first signal");
        let mut b = RiskAssessment::none();
        b.record(55, "second signal");

        let combined = combine_assessments(&cfg, vec![a, b]);
        assert_eq!(combined.risk_score, 55);
        assert_eq!(combined.reasons, vec!["first signal", "second signal"]);
        assert!(!combined.is_anomalous);
    }

    #[test]
    fn two_weak_anomalous_signals_compound() {
        let cfg = DetectorConfig::default();
        let a = RiskAssessment {
            is_anomalous: true,
            risk_score: 45,
            reasons: vec!["weak signal one".to_string()],
        };
        let b = RiskAssessment {
            is_anomalous: true,
            risk_score: 40,
            reasons: vec!["weak signal two".to_string()],
        };

        let combined = combine_assessments(&cfg, vec![a, b]);
        assert!(combined.risk_score < cfg.anomalous_threshold);
        assert!(combined.is_anomalous);
    }

    #[test]
    fn empty_parts_combine_to_nothing() {
        let combined = combine_assessments(&DetectorConfig::default(), vec![]);
        assert_eq!(combined.risk_score, 0);
        assert!(!combined.is_anomalous);
        assert!(combined.reasons.is_empty());
    }

    // ── recorder: baseline scores ──

    #[test]
    fn failed_auth_carries_baseline_risk() {
        let (recorder, _) = recorder_with_sink();
        let entry = recorder
            .log_auth_event(
                AuthEvent::Login,
                Some("user-5".to_string()),
                EventMetadata::from_ip("10.0.0.5"),
                EventResult::Failure,
                Some("invalid credentials".to_string()),
            )
            .unwrap();

        assert_eq!(entry.event_type, "auth.login");
        assert_eq!(entry.risk_score, Some(50));
        assert_eq!(entry.error_message.as_deref(), Some("invalid credentials"));
    }

    #[test]
    fn successful_auth_carries_no_risk() {
        let (recorder, _) = recorder_with_sink();
        let entry = recorder
            .log_auth_event(
                AuthEvent::Login,
                Some("user-5".to_string()),
                EventMetadata::default(),
                EventResult::Success,
                None,
            )
            .unwrap();
        assert_eq!(entry.risk_score, None);
    }

    #[test]
    fn large_failed_payment_stacks_baselines() {
        let (recorder, _) = recorder_with_sink();
        let metadata = EventMetadata {
            amount: Some(6_000.0),
            ..EventMetadata::default()
        };

        let entry = recorder
            .log_payment_event(
                PaymentEvent::Failed,
                "user-6",
                "order-77",
                metadata,
                EventResult::Failure,
                Some("card declined".to_string()),
            )
            .unwrap();

        // 30 (over $1k) + 20 (over $5k) + 25 (failure).
        assert_eq!(entry.risk_score, Some(75));
        assert_eq!(entry.resource_id.as_deref(), Some("order-77"));
    }

    #[test]
    fn shipping_address_change_scores_sixty() {
        let (recorder, _) = recorder_with_sink();
        let changes = ChangeSet {
            before: Some(serde_json::json!({"shipping_address": "1 Main St"})),
            after: Some(serde_json::json!({"shipping_address": "99 Other Rd"})),
        };

        let entry = recorder
            .log_order_event(
                OrderEvent::Updated,
                "user-7",
                "order-12",
                Some(changes),
                EventMetadata::default(),
                EventResult::Success,
                None,
            )
            .unwrap();
        assert_eq!(entry.risk_score, Some(60));
    }

    #[test]
    fn fraud_score_overrides_lower_baseline() {
        let (recorder, _) = recorder_with_sink();
        let metadata = EventMetadata {
            amount: Some(12_000.0),
            ..EventMetadata::default()
        };

        let entry = recorder
            .log_order_event(
                OrderEvent::Created,
                "user-7",
                "order-13",
                None,
                metadata,
                EventResult::Success,
                Some(65),
            )
            .unwrap();
        // Baseline 30 for the amount; the detector's 65 wins.
        assert_eq!(entry.risk_score, Some(65));
    }

    #[test]
    fn security_event_defaults_to_seventy() {
        let (recorder, _) = recorder_with_sink();
        let metadata = EventMetadata {
            reason: Some("rate limit exceeded on /api/login".to_string()),
            ..EventMetadata::from_ip("172.16.0.2")
        };

        let entry = recorder
            .log_security_event(
                SecurityEvent::RateLimitExceeded,
                None,
                metadata,
                None,
            )
            .unwrap();

        assert_eq!(entry.risk_score, Some(70));
        assert_eq!(entry.result, EventResult::Failure);
        assert_eq!(
            entry.error_message.as_deref(),
            Some("rate limit exceeded on /api/login")
        );
    }

    // ── recorder: escalation ──

    #[test]
    fn role_change_dispatches_a_critical_alert() {
        let (recorder, sink) = recorder_with_sink();
        let entry = recorder
            .log_user_event(
                UserEvent::RoleChange,
                "user-8",
                None,
                EventMetadata::default(),
                EventResult::Success,
            )
            .unwrap();
        assert_eq!(entry.risk_score, Some(80));

        let alerts = wait_for_alerts(&sink, 1);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].event_type.as_deref(), Some("user.role_change"));
    }

    #[test]
    fn medium_risk_events_do_not_alert() {
        let (recorder, sink) = recorder_with_sink();
        recorder
            .log_user_event(
                UserEvent::AddressChange,
                "user-9",
                None,
                EventMetadata::default(),
                EventResult::Success,
            )
            .unwrap();

        std::thread::sleep(StdDuration::from_millis(30));
        assert!(sink.sent().is_empty());
    }
}
