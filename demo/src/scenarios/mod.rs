//! VIGIL demo scenarios.
//!
//! Each scenario is a self-contained module that wires up real VIGIL
//! components (ledger, fraud engine, event recorder, alert dispatcher)
//! with mock storefront traffic and demonstrates a distinct behavior.

pub mod brute_force;
pub mod checkout;
pub mod metrics;
pub mod tamper;

use std::sync::Arc;

use vigil_alert::{AlertDispatcher, TracingSink};
use vigil_contracts::error::VigilResult;
use vigil_fraud::{EventRecorder, FraudEngine, InMemoryOrderStore};
use vigil_ledger::{InMemoryLedger, SigningKey};

/// Demo-only signing secret. A real deployment reads this from the
/// environment or a secret store, never from source.
pub const DEMO_SIGNING_KEY: &str = "vigil-demo-signing-key-0123456789";

/// The component set every scenario starts from.
pub struct DemoStack {
    pub ledger: Arc<InMemoryLedger>,
    pub orders: Arc<InMemoryOrderStore>,
    pub engine: FraudEngine,
    pub recorder: EventRecorder,
}

/// Wire up a fresh ledger, order store, engine, and recorder with the
/// default detector thresholds and a tracing-backed alert sink.
pub fn build_stack() -> VigilResult<DemoStack> {
    let key = SigningKey::from_config_str(DEMO_SIGNING_KEY)?;
    let ledger = Arc::new(InMemoryLedger::new(key));
    let orders = Arc::new(InMemoryOrderStore::new());
    let dispatcher = Arc::new(AlertDispatcher::new(Arc::new(TracingSink)));

    Ok(DemoStack {
        engine: FraudEngine::new(
            vigil_detect::config::DetectorConfig::default(),
            ledger.clone(),
            orders.clone(),
        ),
        recorder: EventRecorder::new(ledger.clone(), dispatcher),
        ledger,
        orders,
    })
}

pub fn print_assessment(label: &str, assessment: &vigil_contracts::risk::RiskAssessment) {
    println!("  {label}");
    println!(
        "    risk score : {}/100{}",
        assessment.risk_score,
        if assessment.is_anomalous {
            "  ** ANOMALOUS **"
        } else {
            ""
        }
    );
    if assessment.reasons.is_empty() {
        println!("    reasons    : none");
    } else {
        for reason in &assessment.reasons {
            println!("    reason     : {reason}");
        }
    }
}
