//! High-value order detector.
//!
//! Scores a proposed order against the user's purchase history. The
//! amount-magnitude rules (first-order floor, average multiple, absolute
//! ceiling) are severity tiers of the same concern and combine by maximum;
//! the new-shipping-address rule is an independent concern and stacks
//! additively on top. Final score capped at 100.

use tracing::debug;

use vigil_contracts::risk::RiskAssessment;

use crate::{config::DetectorConfig, history::OrderRecord};

/// Score a proposed order of `amount` shipping to `shipping_address`.
///
/// `history` is the user's full past order set (any status — the average
/// is over everything the user has ordered, which keeps the historical set
/// consistent without depending on a status taxonomy). An empty history is
/// insufficient data for the average and address rules, never an anomaly
/// in itself; only the first-order floor and the absolute ceiling can fire.
pub fn detect_high_value_order(
    cfg: &DetectorConfig,
    amount: f64,
    shipping_address: Option<&str>,
    history: &[OrderRecord],
) -> RiskAssessment {
    let mut assessment = RiskAssessment::none();

    if history.is_empty() {
        if amount > cfg.first_order_high_value {
            assessment.record_at_least(50, "First order with high value");
        }
    } else {
        let average = history.iter().map(|o| o.amount).sum::<f64>() / history.len() as f64;

        // Average of zero-value orders gives no meaningful multiple.
        if average > 0.0 && amount >= cfg.average_multiple * average {
            let multiple = amount / average;
            // Base 40, plus 10 per whole multiple beyond the threshold,
            // capped so the tier alone stays below the ceiling tier.
            let scaled = 40 + (((multiple - cfg.average_multiple) * 10.0) as u8).min(25);
            assessment.record_at_least(
                scaled,
                format!("Order is {}x higher than average", multiple.floor() as u64),
            );

            if let Some(addr) = shipping_address {
                let known = history
                    .iter()
                    .filter_map(|o| o.shipping_address.as_deref())
                    .any(|seen| seen == addr);
                if !known {
                    // Independent concern: stacks with the multiple tier.
                    assessment.record(60, "New shipping address on high-value order");
                }
            }
        }
    }

    if amount > cfg.absolute_order_ceiling {
        assessment.record_at_least(
            70,
            format!(
                "Order exceeds absolute threshold of ${}",
                format_amount(cfg.absolute_order_ceiling)
            ),
        );
    }

    debug!(
        amount,
        score = assessment.risk_score,
        history_len = history.len(),
        "high-value order detector finished"
    );
    assessment.finalized(cfg.anomalous_threshold)
}

/// Render a dollar amount with thousands separators, e.g. `10,000`.
fn format_amount(amount: f64) -> String {
    let whole = amount as u64;
    let s = whole.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
