//! Payment fraud detector.
//!
//! Three independent concerns over the user's recent payment events:
//! attempt velocity in the last hour, distinct source IPs in the last
//! 24 hours, and the overall failure rate. They combine additively,
//! capped at 100.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use vigil_contracts::risk::RiskAssessment;

use crate::{config::DetectorConfig, history::PaymentRecord};

/// Score a proposed payment from `current_ip` against the user's recent
/// payment history.
///
/// `payments` should cover at least the last 24 hours before `now`. An
/// empty history is insufficient data: no rule fires, and in particular
/// the failure rate is never computed over a zero denominator.
pub fn detect_payment_fraud(
    cfg: &DetectorConfig,
    current_ip: Option<&str>,
    now: DateTime<Utc>,
    payments: &[PaymentRecord],
) -> RiskAssessment {
    let hour_ago = now - Duration::hours(1);
    let day_ago = now - Duration::hours(24);

    let mut assessment = RiskAssessment::none();

    let last_hour = payments.iter().filter(|p| p.timestamp >= hour_ago).count();
    if last_hour > cfg.hourly_payment_limit {
        assessment.record(
            40,
            format!("{} payment attempts in the last hour", last_hour),
        );
    }

    let mut ips: HashSet<&str> = payments
        .iter()
        .filter(|p| p.timestamp >= day_ago)
        .filter_map(|p| p.ip.as_deref())
        .collect();
    if let Some(ip) = current_ip {
        ips.insert(ip);
    }
    if ips.len() >= cfg.distinct_ip_threshold {
        assessment.record(30, "Payments from multiple IP addresses");
    }

    let total = payments.len();
    if total >= cfg.failure_rate_min_samples {
        let failed = payments.iter().filter(|p| !p.succeeded).count();
        let rate = failed as f64 / total as f64;
        if rate >= cfg.failure_rate_threshold {
            assessment.record(
                50,
                format!("{:.0}% payment failure rate", rate * 100.0),
            );
        }
    }

    debug!(
        last_hour,
        distinct_ips = ips.len(),
        total_payments = total,
        score = assessment.risk_score,
        "payment fraud detector finished"
    );
    assessment.finalized(cfg.anomalous_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DetectorConfig {
        DetectorConfig::default()
    }

    fn payment(
        ip: &str,
        succeeded: bool,
        minutes_ago: i64,
        now: DateTime<Utc>,
    ) -> PaymentRecord {
        PaymentRecord {
            user_id: "user-1".to_string(),
            amount: Some(100.0),
            ip: Some(ip.to_string()),
            succeeded,
            timestamp: now - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn five_attempts_in_an_hour_fire_velocity_rule() {
        let now = Utc::now();
        let payments: Vec<_> = (0..5).map(|_| payment("192.0.2.1", true, 30, now)).collect();
        let result = detect_payment_fraud(&cfg(), Some("192.0.2.1"), now, &payments);

        assert!(result.risk_score >= 40);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("5 payment attempts")));
    }

    #[test]
    fn four_distinct_ips_fire_multi_ip_rule() {
        let now = Utc::now();
        // Three historical IPs over the last day plus a fresh fourth.
        let payments: Vec<_> = ["192.0.2.1", "192.0.2.2", "192.0.2.3"]
            .iter()
            .map(|ip| payment(ip, true, 12 * 60, now))
            .collect();
        let result = detect_payment_fraud(&cfg(), Some("192.0.2.4"), now, &payments);

        assert!(result.risk_score >= 30);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("multiple IP addresses")));
    }

    #[test]
    fn high_failure_rate_fires_with_enough_samples() {
        let now = Utc::now();
        let mut payments: Vec<_> = (0..7).map(|i| payment("192.0.2.1", false, 60 + i, now)).collect();
        payments.push(payment("192.0.2.1", true, 90, now));
        payments.push(payment("192.0.2.1", true, 95, now));
        // 7 of 9 failed ≈ 78%.
        let result = detect_payment_fraud(&cfg(), Some("192.0.2.1"), now, &payments);

        assert!(result.risk_score >= 50);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("78% payment failure rate")));
    }

    #[test]
    fn failure_rate_needs_minimum_samples() {
        let now = Utc::now();
        // Two failures out of two: 100% — but far too few samples to judge.
        let payments = vec![
            payment("192.0.2.1", false, 30, now),
            payment("192.0.2.1", false, 40, now),
        ];
        let result = detect_payment_fraud(&cfg(), Some("192.0.2.1"), now, &payments);
        assert!(!result
            .reasons
            .iter()
            .any(|r| r.contains("failure rate")));
    }

    #[test]
    fn concerns_stack_additively() {
        let now = Utc::now();
        let mut payments: Vec<_> = ["192.0.2.1", "192.0.2.2", "192.0.2.3", "192.0.2.4"]
            .iter()
            .map(|ip| payment(ip, false, 20, now))
            .collect();
        payments.push(payment("192.0.2.1", false, 25, now));
        // 5 attempts in the hour, 4+ IPs, 100% failure over 5 samples.
        let result = detect_payment_fraud(&cfg(), Some("192.0.2.5"), now, &payments);

        assert!(result.is_anomalous);
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.reasons.len(), 3);
    }

    #[test]
    fn empty_history_yields_no_signal() {
        let result = detect_payment_fraud(&cfg(), Some("192.0.2.1"), Utc::now(), &[]);
        assert!(!result.is_anomalous);
        assert_eq!(result.risk_score, 0);
        assert!(result.reasons.is_empty());
    }
}
