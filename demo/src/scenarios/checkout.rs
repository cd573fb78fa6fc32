//! Scenario 1: Checkout fraud screening.
//!
//! A returning customer with a modest purchase history places three
//! orders in a row:
//!
//!   1. A routine $120 order to their usual address — passes clean.
//!   2. A $900 order to a brand-new address — high-value multiple plus
//!      the new-address signal, flagged anomalous.
//!   3. A $15,000 order — trips the absolute ceiling outright.
//!
//! Each order is recorded in the ledger with its fraud score attached,
//! so the audit trail carries the evidence the decision was made on.

use chrono::{Duration, Utc};

use vigil_contracts::{
    entry::{EventMetadata, EventResult},
    error::VigilResult,
    risk::FraudCheckRequest,
};
use vigil_detect::history::OrderRecord;
use vigil_fraud::OrderEvent;

use super::{build_stack, print_assessment};

const USER: &str = "cust-4412";
const HOME: &str = "12 Elm Street, Springfield";

pub fn run_scenario() -> VigilResult<()> {
    println!("Scenario: checkout fraud screening");
    println!("----------------------------------");

    let stack = build_stack()?;

    // Seed a plausible purchase history: five orders over two months,
    // all around $100, all shipped home.
    for week in 1..=5 {
        stack.orders.add(OrderRecord::new(
            USER,
            95.0 + week as f64 * 5.0,
            Some(HOME.to_string()),
            Utc::now() - Duration::weeks(week),
        ));
    }

    let orders = [
        ("routine reorder", 120.0, HOME),
        ("gift to a new address", 900.0, "7 Harbor View, Lakeshore"),
        ("bulk electronics order", 15_000.0, HOME),
    ];

    for (i, (label, amount, address)) in orders.iter().enumerate() {
        let request = FraudCheckRequest::order(USER, *amount, Some(address.to_string()));
        let assessment = stack.engine.perform_fraud_check(&request)?;
        print_assessment(&format!("order {} — {} (${})", i + 1, label, amount), &assessment);

        let metadata = EventMetadata {
            amount: Some(*amount),
            currency: Some("USD".to_string()),
            shipping_address: Some(address.to_string()),
            ..EventMetadata::default()
        };
        stack.recorder.log_order_event(
            OrderEvent::Created,
            USER,
            format!("order-{}", 9000 + i),
            None,
            metadata,
            EventResult::Success,
            Some(assessment.risk_score),
        );
    }

    let status = stack.ledger.verify_integrity(vigil_ledger::DEFAULT_VERIFY_LIMIT);
    println!("  ledger after checkout run: {} entries, chain {:?}", stack.ledger.len(), status);
    println!();
    Ok(())
}
