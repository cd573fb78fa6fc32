//! Scenario 2: Brute-force login detection.
//!
//! An attacker hammers one account from a single IP. Every failed
//! attempt is recorded twice, the way the application layer does it:
//! once as the `auth.login` failure itself, once as a
//! `security.failed_login` event the detector feeds on. After ten
//! attempts the login check flags the pattern and a critical alert is
//! dispatched; the alert lands in the log via the tracing sink.

use vigil_contracts::{
    entry::{EventMetadata, EventResult},
    error::VigilResult,
    risk::FraudCheckRequest,
};
use vigil_fraud::{AuthEvent, SecurityEvent};

use super::{build_stack, print_assessment};

const VICTIM: &str = "cust-0007";
const ATTACKER_IP: &str = "203.0.113.54";

pub fn run_scenario() -> VigilResult<()> {
    println!("Scenario: brute-force login detection");
    println!("-------------------------------------");

    let stack = build_stack()?;

    for attempt in 1..=10 {
        stack.recorder.log_auth_event(
            AuthEvent::Login,
            Some(VICTIM.to_string()),
            EventMetadata::from_ip(ATTACKER_IP),
            EventResult::Failure,
            Some("invalid credentials".to_string()),
        );
        stack.recorder.log_security_event(
            SecurityEvent::FailedLogin,
            Some(VICTIM.to_string()),
            EventMetadata {
                attempt_count: Some(attempt),
                ..EventMetadata::from_ip(ATTACKER_IP)
            },
            Some(60),
        );
    }

    // The eleventh attempt is screened before it is processed.
    let request = FraudCheckRequest::login(Some(VICTIM.to_string()), ATTACKER_IP);
    let assessment = stack.engine.perform_fraud_check(&request)?;
    print_assessment("login attempt 11 from the same IP", &assessment);

    if assessment.is_anomalous {
        stack.recorder.log_security_event(
            SecurityEvent::SuspiciousActivity,
            Some(VICTIM.to_string()),
            EventMetadata {
                reason: Some(format!(
                    "brute-force pattern: {}",
                    assessment.reasons.join("; ")
                )),
                ..EventMetadata::from_ip(ATTACKER_IP)
            },
            Some(assessment.risk_score),
        );
        println!("  -> suspicious-activity event recorded; alert dispatched to the log sink");
    }

    println!("  ledger holds {} entries for this attack window", stack.ledger.len());
    println!();
    Ok(())
}
