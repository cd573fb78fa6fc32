//! Security-metrics rollups for the admin/monitoring surface.
//!
//! Everything here is derived purely by composing the ledger's `query` and
//! `statistics` operations over a named time window — no extra state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use vigil_contracts::{
    error::VigilResult,
    query::{EntryFilter, EventTypeCount, StatsFilter},
};

use crate::memory::InMemoryLedger;

/// Cap on per-metric sampling queries, matching the admin surface's page cap.
const METRIC_QUERY_LIMIT: usize = 1000;

/// How many event types to keep in the `top_events` breakdown.
const TOP_EVENTS: usize = 10;

/// Named lookback windows for the monitoring dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
}

impl TimeRange {
    /// The short label used on the wire and in dashboards.
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Hour => "1h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }

    fn duration(self) -> Duration {
        match self {
            TimeRange::Hour => Duration::hours(1),
            TimeRange::Day => Duration::hours(24),
            TimeRange::Week => Duration::days(7),
            TimeRange::Month => Duration::days(30),
        }
    }
}

/// Success/failure rates over the window, as percentages in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsOverview {
    pub total_events: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
}

/// Security-specific counters over the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityCounts {
    pub failed_logins: usize,
    pub fraud_detections: usize,
    /// Orders created with risk score ≥ 70.
    pub high_risk_orders: usize,
    /// Failed payments with risk score ≥ 60.
    pub blocked_payments: usize,
    /// All entries with risk score ≥ 70, regardless of type.
    pub high_risk_events: usize,
}

/// The full rollup returned to the monitoring dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityMetrics {
    pub range: TimeRange,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub overview: MetricsOverview,
    pub security: SecurityCounts,
    /// Top event types by count, at most ten.
    pub top_events: Vec<EventTypeCount>,
}

/// Roll up security metrics for the given window ending now.
pub fn security_metrics(ledger: &InMemoryLedger, range: TimeRange) -> VigilResult<SecurityMetrics> {
    let end = Utc::now();
    let start = end - range.duration();

    let stats = ledger.statistics(&StatsFilter {
        user_id: None,
        start: Some(start),
        end: Some(end),
    })?;

    let windowed = |event_type: &str, min_risk_score: Option<u8>| EntryFilter {
        event_type: Some(event_type.to_string()),
        start: Some(start),
        end: Some(end),
        min_risk_score,
        limit: Some(METRIC_QUERY_LIMIT),
        ..EntryFilter::default()
    };

    let failed_logins = ledger.query(&windowed("security.failed_login", None))?.total;
    let fraud_detections = ledger
        .query(&windowed("security.fraud_detected", None))?
        .total;
    let high_risk_orders = ledger.query(&windowed("order.created", Some(70)))?.total;
    let blocked_payments = ledger.query(&windowed("payment.failed", Some(60)))?.total;

    let rate = |count: usize| {
        if stats.total_events == 0 {
            0.0
        } else {
            count as f64 / stats.total_events as f64 * 100.0
        }
    };

    let mut top_events = stats.events_by_type;
    top_events.truncate(TOP_EVENTS);

    Ok(SecurityMetrics {
        range,
        start,
        end,
        overview: MetricsOverview {
            total_events: stats.total_events,
            success_rate: rate(stats.success_count),
            failure_rate: rate(stats.failure_count),
        },
        security: SecurityCounts {
            failed_logins,
            fraud_detections,
            high_risk_orders,
            blocked_payments,
            high_risk_events: stats.high_risk_count,
        },
        top_events,
    })
}
