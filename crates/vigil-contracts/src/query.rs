//! Filter and result types for the ledger's read surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{AuditEntry, EventResult};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Risk score at or above which an entry counts as high-risk in
/// statistics and alerting.
pub const HIGH_RISK_FLOOR: u8 = 70;

/// Predicates for `query`. Every field is optional; an empty filter matches
/// all entries. The selective predicates (event type, user, time range,
/// risk score) are the ones a persistent store would index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Matches every event type sharing a dotted-taxonomy prefix, e.g.
    /// `payment.` for all payment events. Applied before pagination, so a
    /// page limit never pushes matching entries off the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Inclusive lower bound on `timestamp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EventResult>,
    /// Matches entries with `risk_score >= min_risk_score`. Entries with no
    /// score never match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_risk_score: Option<u8>,
    /// Page size; defaults to [`DEFAULT_PAGE_LIMIT`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Entries to skip before the page starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl EntryFilter {
    /// Filter on a single event type, everything else unconstrained.
    pub fn for_event_type(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Self::default()
        }
    }

    /// Filter on a single user, everything else unconstrained.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Return true if `entry` satisfies every set predicate.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(ref et) = self.event_type {
            if &entry.event_type != et {
                return false;
            }
        }
        if let Some(ref prefix) = self.event_type_prefix {
            if !entry.event_type.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(ref uid) = self.user_id {
            if entry.user_id.as_deref() != Some(uid.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        if let Some(result) = self.result {
            if entry.result != result {
                return false;
            }
        }
        if let Some(min) = self.min_risk_score {
            match entry.risk_score {
                Some(score) if score >= min => {}
                _ => return false,
            }
        }
        true
    }
}

/// One page of query results, newest first, plus the total match count
/// across all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPage {
    pub entries: Vec<AuditEntry>,
    pub total: usize,
}

/// Predicates for `statistics` — a subset of [`EntryFilter`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl StatsFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(ref uid) = self.user_id {
            if entry.user_id.as_deref() != Some(uid.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }
}

/// Per-event-type count in the statistics breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeCount {
    pub event_type: String,
    pub count: usize,
}

/// Aggregate counts over the filtered window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_events: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Entries with `risk_score >= 70`.
    pub high_risk_count: usize,
    /// Counts per event type, sorted descending by count.
    pub events_by_type: Vec<EventTypeCount>,
}
