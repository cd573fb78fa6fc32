//! Failed login pattern detector.
//!
//! Three rules over recent failed-login attempts:
//!
//! - per-user count in the window (tier 60)
//! - per-IP count in the window (tier 70 — an IP hammering many victim
//!   accounts is a stronger brute-force signal than one account's count)
//! - timing analysis: near-constant inter-attempt intervals from one IP
//!   indicate automation (additive 80)
//!
//! The per-user and per-IP rules are severity tiers of the same concern
//! and combine by maximum; the automation bonus stacks additively up to
//! the 100 cap. An anonymous attempt stream (no user id) degrades to the
//! IP-only signal.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use vigil_contracts::risk::RiskAssessment;

use crate::{config::DetectorConfig, history::LoginAttempt};

/// Score the failed-login pattern targeting `user_id` and/or seen from `ip`.
///
/// `attempts` are failed-login events; entries outside the configured
/// window before `now` are ignored. No attempts means no signal.
pub fn detect_failed_login_pattern(
    cfg: &DetectorConfig,
    user_id: Option<&str>,
    ip: &str,
    now: DateTime<Utc>,
    attempts: &[LoginAttempt],
) -> RiskAssessment {
    let window_start = now - Duration::minutes(cfg.failed_login_window_minutes);
    let recent: Vec<&LoginAttempt> = attempts
        .iter()
        .filter(|a| a.timestamp >= window_start)
        .collect();

    let mut assessment = RiskAssessment::none();

    if let Some(uid) = user_id {
        let user_count = recent
            .iter()
            .filter(|a| a.user_id.as_deref() == Some(uid))
            .count();
        if user_count >= cfg.failed_login_threshold {
            assessment.record_at_least(60, format!("{} failed login attempts", user_count));
        }
    }

    let mut ip_times: Vec<DateTime<Utc>> = recent
        .iter()
        .filter(|a| a.ip.as_deref() == Some(ip))
        .map(|a| a.timestamp)
        .collect();
    ip_times.sort_unstable();

    if ip_times.len() >= cfg.failed_login_threshold {
        assessment.record_at_least(
            70,
            format!("{} failed login attempts from IP {}", ip_times.len(), ip),
        );
    }

    if machine_like_timing(cfg, &ip_times) {
        assessment.record(80, "Automated brute force pattern detected");
    }

    debug!(
        ip,
        ip_attempts = ip_times.len(),
        score = assessment.risk_score,
        "failed login pattern detector finished"
    );
    assessment.finalized(cfg.anomalous_threshold)
}

/// True when the inter-attempt intervals from one IP are too regular for a
/// human: standard deviation below max(1s, 15% of the mean interval).
fn machine_like_timing(cfg: &DetectorConfig, sorted_times: &[DateTime<Utc>]) -> bool {
    if sorted_times.len() < cfg.automation_min_attempts {
        return false;
    }

    let intervals: Vec<f64> = sorted_times
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds() as f64 / 1000.0)
        .collect();

    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    let variance = intervals
        .iter()
        .map(|i| (i - mean).powi(2))
        .sum::<f64>()
        / intervals.len() as f64;
    let std_dev = variance.sqrt();

    std_dev < (mean * 0.15).max(1.0)
}
