//! Rapid order creation detector.
//!
//! Two independent concerns: a short burst (orders in the last hour) and
//! sustained high volume (orders in the last 24 hours). Both can fire and
//! combine additively, capped at 100.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use vigil_contracts::risk::RiskAssessment;

use crate::config::DetectorConfig;

/// Score the user's recent ordering velocity.
///
/// `order_times` are the creation instants of the user's recent orders;
/// entries older than 24 hours before `now` are ignored. An empty slice is
/// simply a quiet account.
pub fn detect_rapid_order_creation(
    cfg: &DetectorConfig,
    now: DateTime<Utc>,
    order_times: &[DateTime<Utc>],
) -> RiskAssessment {
    let hour_ago = now - Duration::hours(1);
    let day_ago = now - Duration::hours(24);

    let last_hour = order_times.iter().filter(|t| **t >= hour_ago).count();
    let last_day = order_times.iter().filter(|t| **t >= day_ago).count();

    let mut assessment = RiskAssessment::none();

    if last_hour > cfg.hourly_order_limit {
        assessment.record(
            70,
            format!("{} orders created in the last hour", last_hour),
        );
    }
    if last_day > cfg.daily_order_limit {
        assessment.record(
            50,
            format!("{} orders created in the last 24 hours", last_day),
        );
    }

    debug!(
        last_hour,
        last_day,
        score = assessment.risk_score,
        "rapid order creation detector finished"
    );
    assessment.finalized(cfg.anomalous_threshold)
}
