//! Fraud orchestration: detector selection, history fetch, aggregation.
//!
//! The engine owns the read side of a fraud check. For each triggering
//! action it fetches the relevant history (order store for purchase
//! history, audit ledger for login and payment events), runs the matching
//! detectors, and folds their assessments into one aggregate:
//!
//! - headline score = **maximum** across detectors (the worst single
//!   dimension drives the decision)
//! - reasons = concatenation of every fired reason, in detector order —
//!   nothing is dropped even when its score did not win the max
//! - anomalous = max ≥ threshold, OR at least `compound_min_signals`
//!   detectors independently flagged anomalous (several weak signals
//!   compounding is itself suspicious)

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use vigil_contracts::{
    error::VigilResult,
    query::EntryFilter,
    risk::{FraudCheckRequest, RiskAssessment, TriggerAction},
};
use vigil_detect::{
    config::DetectorConfig,
    detect_failed_login_pattern, detect_high_value_order, detect_payment_fraud,
    detect_rapid_order_creation,
    history::{LoginAttempt, OrderRecord, PaymentRecord},
};
use vigil_ledger::InMemoryLedger;

/// Cap on history fetched per detector run.
const HISTORY_FETCH_LIMIT: usize = 1000;

/// Read access to a user's purchase history.
///
/// The order system is an external collaborator; this trait is the seam
/// the engine consumes it through.
pub trait OrderStore: Send + Sync {
    /// All known past orders for the user, any status.
    fn orders_for_user(&self, user_id: &str) -> Vec<OrderRecord>;
}

/// A `Vec`-backed order store for tests and the demo.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, order: OrderRecord) {
        self.orders
            .lock()
            .expect("order store lock poisoned")
            .push(order);
    }
}

impl OrderStore for InMemoryOrderStore {
    fn orders_for_user(&self, user_id: &str) -> Vec<OrderRecord> {
        self.orders
            .lock()
            .expect("order store lock poisoned")
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// The fraud orchestrator.
pub struct FraudEngine {
    config: DetectorConfig,
    ledger: Arc<InMemoryLedger>,
    orders: Arc<dyn OrderStore>,
}

impl FraudEngine {
    pub fn new(
        config: DetectorConfig,
        ledger: Arc<InMemoryLedger>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            config,
            ledger,
            orders,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run the detectors relevant to the request's action and aggregate
    /// their findings. The detectors themselves are side-effect-free; the
    /// only I/O here is the read-only history fetch.
    pub fn perform_fraud_check(&self, request: &FraudCheckRequest) -> VigilResult<RiskAssessment> {
        let now = Utc::now();

        let assessments = match request.action {
            TriggerAction::Order => {
                let Some(user_id) = request.user_id.as_deref() else {
                    // No principal means no history to judge against.
                    return Ok(RiskAssessment::none());
                };
                let history = self.orders.orders_for_user(user_id);
                let order_times: Vec<_> = history.iter().map(|o| o.created_at).collect();

                vec![
                    detect_high_value_order(
                        &self.config,
                        request.amount.unwrap_or(0.0),
                        request.shipping_address.as_deref(),
                        &history,
                    ),
                    detect_rapid_order_creation(&self.config, now, &order_times),
                ]
            }

            TriggerAction::Payment => {
                let Some(user_id) = request.user_id.as_deref() else {
                    return Ok(RiskAssessment::none());
                };
                let payments = self.payment_history(user_id)?;
                vec![detect_payment_fraud(
                    &self.config,
                    request.ip.as_deref(),
                    now,
                    &payments,
                )]
            }

            TriggerAction::Login => {
                if request.user_id.is_none() && request.ip.is_none() {
                    return Ok(RiskAssessment::none());
                }
                let attempts = self.failed_login_history()?;
                vec![detect_failed_login_pattern(
                    &self.config,
                    request.user_id.as_deref(),
                    request.ip.as_deref().unwrap_or(""),
                    now,
                    &attempts,
                )]
            }
        };

        let aggregate = combine_assessments(&self.config, assessments);
        if aggregate.is_anomalous {
            warn!(
                user_id = ?request.user_id,
                action = ?request.action,
                risk_score = aggregate.risk_score,
                reasons = ?aggregate.reasons,
                "fraud check flagged anomalous activity"
            );
        } else {
            debug!(
                user_id = ?request.user_id,
                action = ?request.action,
                risk_score = aggregate.risk_score,
                "fraud check passed"
            );
        }
        Ok(aggregate)
    }

    /// The user's `payment.*` ledger entries from the last 24 hours.
    fn payment_history(&self, user_id: &str) -> VigilResult<Vec<PaymentRecord>> {
        // Prefix filtering happens inside the query, so the fetch limit
        // caps payment events rather than the user's events of any type.
        let page = self.ledger.query(&EntryFilter {
            user_id: Some(user_id.to_string()),
            event_type_prefix: Some("payment.".to_string()),
            start: Some(Utc::now() - Duration::hours(24)),
            limit: Some(HISTORY_FETCH_LIMIT),
            ..EntryFilter::default()
        })?;
        Ok(page
            .entries
            .iter()
            .filter_map(PaymentRecord::from_entry)
            .collect())
    }

    /// Recent failed-login entries across all users (the per-IP rule needs
    /// attempts against other accounts too).
    fn failed_login_history(&self) -> VigilResult<Vec<LoginAttempt>> {
        let window = Duration::minutes(self.config.failed_login_window_minutes);
        let page = self.ledger.query(&EntryFilter {
            event_type: Some("security.failed_login".to_string()),
            start: Some(Utc::now() - window),
            limit: Some(HISTORY_FETCH_LIMIT),
            ..EntryFilter::default()
        })?;
        Ok(page.entries.iter().map(LoginAttempt::from_entry).collect())
    }
}

/// Fold detector outputs into the aggregate assessment.
///
/// Exposed as a standalone function so the combination policy — a
/// judgment call, deliberately configurable — can be tested without a
/// ledger behind it.
pub fn combine_assessments(
    cfg: &DetectorConfig,
    parts: Vec<RiskAssessment>,
) -> RiskAssessment {
    let max_score = parts.iter().map(|a| a.risk_score).max().unwrap_or(0);
    let flagged = parts.iter().filter(|a| a.is_anomalous).count();
    let reasons: Vec<String> = parts.into_iter().flat_map(|a| a.reasons).collect();

    RiskAssessment {
        is_anomalous: max_score >= cfg.anomalous_threshold
            || flagged >= cfg.compound_min_signals,
        risk_score: max_score,
        reasons,
    }
}
