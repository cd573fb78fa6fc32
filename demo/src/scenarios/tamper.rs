//! Scenario 3: Tamper evidence.
//!
//! Writes a short run of entries, confirms the chain verifies, then
//! demonstrates the two integrity guarantees:
//!
//!   - the ledger refuses in-place mutation outright (`update_entry` and
//!     `delete_entry` always fail), and
//!   - an attacker who edits an exported copy of the log is caught by
//!     chain verification, which pinpoints the forged record.

use vigil_contracts::{
    entry::{EventMetadata, EventResult, NewEntry},
    error::VigilResult,
    query::EntryFilter,
};
use vigil_fraud::{AuthEvent, PaymentEvent};
use vigil_ledger::{verify_chain, SigningKey, DEFAULT_VERIFY_LIMIT};

use super::{build_stack, DEMO_SIGNING_KEY};

pub fn run_scenario() -> VigilResult<()> {
    println!("Scenario: tamper evidence");
    println!("-------------------------");

    let stack = build_stack()?;

    stack.recorder.log_auth_event(
        AuthEvent::Login,
        Some("cust-2190".to_string()),
        EventMetadata::from_ip("198.51.100.23"),
        EventResult::Success,
        None,
    );
    stack.recorder.log_payment_event(
        PaymentEvent::Completed,
        "cust-2190",
        "order-5512",
        EventMetadata {
            amount: Some(74.99),
            currency: Some("USD".to_string()),
            ..EventMetadata::default()
        },
        EventResult::Success,
        None,
    );
    stack.recorder.log_auth_event(
        AuthEvent::Logout,
        Some("cust-2190".to_string()),
        EventMetadata::default(),
        EventResult::Success,
        None,
    );

    let status = stack.ledger.verify_integrity(DEFAULT_VERIFY_LIMIT);
    println!("  freshly written chain: {:?}", status);

    // In-place mutation is rejected no matter what the caller supplies.
    let forged = NewEntry::new("payment.refunded", "payment", EventResult::Success);
    match stack.ledger.update_entry(1, forged) {
        Err(e) => println!("  update_entry(1) rejected: {}", e),
        Ok(()) => unreachable!("the ledger never accepts updates"),
    }
    match stack.ledger.delete_entry(1) {
        Err(e) => println!("  delete_entry(1) rejected: {}", e),
        Ok(()) => unreachable!("the ledger never accepts deletes"),
    }

    // An exported copy can be edited freely, but not undetectably.
    let page = stack.ledger.query(&EntryFilter::default())?;
    let mut exported: Vec<_> = page.entries.into_iter().rev().collect();
    println!("  exported {} entries; doctoring the payment amount...", exported.len());
    exported[1].metadata.amount = Some(0.99);

    let key = SigningKey::from_config_str(DEMO_SIGNING_KEY)?;
    let status = verify_chain(&key, &exported);
    println!("  verification of the doctored export: {:?}", status);
    println!();
    Ok(())
}
