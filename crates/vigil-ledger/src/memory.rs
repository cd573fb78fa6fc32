//! In-memory reference implementation of the append-only ledger.
//!
//! `InMemoryLedger` keeps all entries in a `Vec` behind a single `Mutex`.
//! The same critical section that snapshots the previous entry's
//! `(signature, timestamp)` also pushes the new entry, so "get most recent
//! and append" is one atomic operation and there is no read-then-write race
//! between concurrent appenders. The sequence number assigned inside that
//! section is the tie-break: append order is mutex-acquisition order, and
//! `previous_hash` always refers to the entry with `sequence - 1`.
//!
//! There is no update or delete path. The two methods that exist with
//! those names reject unconditionally so the immutability contract is
//! enforced by the store, not by convention.

use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, error, warn};

use vigil_contracts::{
    entry::{AuditEntry, EventResult, NewEntry},
    error::{VigilError, VigilResult},
    query::{
        EntryFilter, EntryPage, EventTypeCount, LedgerStats, StatsFilter, DEFAULT_PAGE_LIMIT,
        HIGH_RISK_FLOOR,
    },
    risk::MAX_RISK_SCORE,
};

use crate::{
    chain::{verify_chain, ChainStatus},
    sign::{chain_hash, sign_entry, SigningKey},
};

/// Default window for `verify_integrity` when callers pass no limit.
pub const DEFAULT_VERIFY_LIMIT: usize = 1000;

/// The mutable interior of an `InMemoryLedger`.
///
/// `pub(crate)` so the crate's tamper tests can corrupt stored entries
/// directly, the way a hostile writer with storage access would.
pub(crate) struct LedgerState {
    /// All entries in append order; index equals sequence.
    pub(crate) entries: Vec<AuditEntry>,
}

/// An append-only, HMAC-signed, hash-chained audit ledger held in memory.
///
/// # Thread safety
///
/// Every operation acquires the internal mutex; the ledger can be shared
/// across request handlers behind an `Arc` without extra synchronization.
pub struct InMemoryLedger {
    key: SigningKey,
    pub(crate) state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    ///
    /// The signing key is validated at construction ([`SigningKey`] refuses
    /// short keys), so a misconfigured deployment fails here — at startup —
    /// rather than per append.
    pub fn new(key: SigningKey) -> Self {
        Self {
            key,
            state: Mutex::new(LedgerState {
                entries: Vec::new(),
            }),
        }
    }

    /// Append one entry: assign sequence and timestamp, derive
    /// `previous_hash` from the most recent entry, sign, persist.
    ///
    /// Fails only on internal store errors (a poisoned lock). Callers on
    /// the business write path should prefer [`record`](Self::record),
    /// which applies the best-effort policy for them.
    pub fn append(&self, draft: NewEntry) -> VigilResult<AuditEntry> {
        let mut state = self.state.lock().map_err(|e| VigilError::AppendFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        let sequence = state.entries.len() as u64;
        let previous_hash = state
            .entries
            .last()
            .map(|prev| chain_hash(&prev.signature, prev.timestamp));

        // Scores above the ceiling violate the [0,100] invariant; clamp and
        // note it rather than reject the whole entry.
        let risk_score = draft.risk_score.map(|s| {
            if s > MAX_RISK_SCORE {
                warn!(sequence, score = s, "clamping out-of-range risk score");
            }
            s.min(MAX_RISK_SCORE)
        });

        let mut entry = AuditEntry {
            sequence,
            timestamp: Utc::now(),
            event_type: draft.event_type,
            user_id: draft.user_id,
            action: draft.action,
            resource: draft.resource,
            resource_id: draft.resource_id,
            changes: draft.changes,
            metadata: draft.metadata,
            result: draft.result,
            error_message: draft.error_message,
            risk_score,
            signature: String::new(),
            previous_hash,
        };
        entry.signature = sign_entry(&self.key, &entry);

        debug!(
            sequence,
            event_type = %entry.event_type,
            risk_score = ?entry.risk_score,
            "audit entry appended"
        );

        state.entries.push(entry.clone());
        Ok(entry)
    }

    /// Best-effort append for the business write path.
    ///
    /// A broken audit trail is a security incident, so failures are logged
    /// at error severity — but they are never propagated: the caller's
    /// primary transaction must not fail because auditing did.
    pub fn record(&self, draft: NewEntry) -> Option<AuditEntry> {
        let event_type = draft.event_type.clone();
        match self.append(draft) {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!(
                    event_type = %event_type,
                    error = %e,
                    "failed to append audit entry; a gap may exist in the ledger"
                );
                None
            }
        }
    }

    /// Filtered, paginated read: newest first, plus the total match count.
    pub fn query(&self, filter: &EntryFilter) -> VigilResult<EntryPage> {
        let state = self.state.lock().map_err(|e| VigilError::QueryFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        let limit = filter.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = filter.offset.unwrap_or(0);

        let mut matches: Vec<&AuditEntry> = state
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .collect();
        let total = matches.len();

        // Newest first: descending sequence is descending append order.
        matches.reverse();
        let entries = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(EntryPage { entries, total })
    }

    /// Aggregate counts over the filtered window.
    pub fn statistics(&self, filter: &StatsFilter) -> VigilResult<LedgerStats> {
        let state = self.state.lock().map_err(|e| VigilError::QueryFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        let mut total_events = 0;
        let mut success_count = 0;
        let mut failure_count = 0;
        let mut high_risk_count = 0;
        let mut by_type: std::collections::HashMap<&str, usize> =
            std::collections::HashMap::new();

        for entry in state.entries.iter().filter(|e| filter.matches(e)) {
            total_events += 1;
            match entry.result {
                EventResult::Success => success_count += 1,
                EventResult::Failure => failure_count += 1,
                EventResult::Partial => {}
            }
            if entry.risk_score.is_some_and(|s| s >= HIGH_RISK_FLOOR) {
                high_risk_count += 1;
            }
            *by_type.entry(entry.event_type.as_str()).or_insert(0) += 1;
        }

        let mut events_by_type: Vec<EventTypeCount> = by_type
            .into_iter()
            .map(|(event_type, count)| EventTypeCount {
                event_type: event_type.to_string(),
                count,
            })
            .collect();
        // Descending by count; ties broken by name so the order is stable.
        events_by_type.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.event_type.cmp(&b.event_type))
        });

        Ok(LedgerStats {
            total_events,
            success_count,
            failure_count,
            high_risk_count,
            events_by_type,
        })
    }

    /// Verify up to `limit` entries from the start of the ledger, in
    /// append order. Read-only and O(limit).
    ///
    /// A non-intact result is the actionable signal, not an error — the
    /// caller must treat it as a critical security incident.
    pub fn verify_integrity(&self, limit: usize) -> ChainStatus {
        let state = match self.state.lock() {
            Ok(state) => state,
            Err(e) => {
                // A ledger we cannot even read is indistinguishable from a
                // corrupted one; report it as malformed rather than panic.
                error!(error = %e, "ledger lock poisoned during verification");
                return ChainStatus::MalformedRecord {
                    sequence: 0,
                    reason: "ledger state unreadable".to_string(),
                };
            }
        };

        let window = &state.entries[..state.entries.len().min(limit)];
        let status = verify_chain(&self.key, window);
        if !status.is_intact() {
            error!(status = ?status, "audit chain integrity violation detected");
        }
        status
    }

    /// Entries are write-once: always rejected.
    pub fn update_entry(&self, sequence: u64, _replacement: NewEntry) -> VigilResult<()> {
        Err(VigilError::ImmutableEntry { sequence })
    }

    /// Entries are write-once: always rejected.
    pub fn delete_entry(&self, sequence: u64) -> VigilResult<()> {
        Err(VigilError::ImmutableEntry { sequence })
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
