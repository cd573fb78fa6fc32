//! Scenario 4: Security metrics rollup.
//!
//! Replays a mixed hour of storefront traffic — clean logins, a couple
//! of failed payments, a fraud detection — then prints the 24-hour
//! security metrics a monitoring dashboard would poll.

use vigil_contracts::{
    entry::{EventMetadata, EventResult},
    error::VigilResult,
};
use vigil_fraud::{AuthEvent, OrderEvent, PaymentEvent, SecurityEvent};
use vigil_ledger::{security_metrics, TimeRange};

use super::build_stack;

pub fn run_scenario() -> VigilResult<()> {
    println!("Scenario: security metrics rollup");
    println!("---------------------------------");

    let stack = build_stack()?;

    for i in 0..6 {
        stack.recorder.log_auth_event(
            AuthEvent::Login,
            Some(format!("cust-{:04}", i)),
            EventMetadata::from_ip(format!("192.0.2.{}", 10 + i)),
            EventResult::Success,
            None,
        );
    }
    stack.recorder.log_order_event(
        OrderEvent::Created,
        "cust-0002",
        "order-8801",
        None,
        EventMetadata {
            amount: Some(240.0),
            currency: Some("USD".to_string()),
            ..EventMetadata::default()
        },
        EventResult::Success,
        None,
    );
    for _ in 0..2 {
        stack.recorder.log_payment_event(
            PaymentEvent::Failed,
            "cust-0004",
            "order-8802",
            EventMetadata {
                amount: Some(1_450.0),
                ..EventMetadata::default()
            },
            EventResult::Failure,
            Some("card declined".to_string()),
        );
    }
    stack.recorder.log_security_event(
        SecurityEvent::FraudDetected,
        Some("cust-0004".to_string()),
        EventMetadata {
            reason: Some("repeated card declines on one order".to_string()),
            ..EventMetadata::default()
        },
        Some(85),
    );

    let metrics = security_metrics(&stack.ledger, TimeRange::Day)?;
    println!("  window           : {} ({} .. {})", metrics.range.label(), metrics.start, metrics.end);
    println!("  total events     : {}", metrics.overview.total_events);
    println!("  success rate     : {:.1}%", metrics.overview.success_rate);
    println!("  failed logins    : {}", metrics.security.failed_logins);
    println!("  fraud detections : {}", metrics.security.fraud_detections);
    println!("  blocked payments : {}", metrics.security.blocked_payments);
    println!("  high-risk events : {}", metrics.security.high_risk_events);
    println!("  top event types  :");
    for item in &metrics.top_events {
        println!("    {:<24} {}", item.event_type, item.count);
    }
    println!();
    Ok(())
}
