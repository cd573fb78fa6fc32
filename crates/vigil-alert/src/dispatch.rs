//! Alert dispatch: severity gating and fire-and-forget delivery.
//!
//! The dispatcher never blocks the ledger write path and never propagates
//! a delivery failure upward: sending happens on a detached thread and
//! errors are logged, full stop.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use vigil_contracts::error::VigilResult;

use crate::alert::{Alert, Severity};

/// An outbound delivery channel (email, pager, webhook, …).
///
/// Implementations must be safe to call from a detached thread. A real
/// deployment implements this over SMTP or a chat webhook; the crate
/// ships a tracing-backed sink and an in-memory capture sink.
pub trait AlertSink: Send + Sync {
    /// Deliver one alert. Errors are reported to the dispatch layer,
    /// which logs and swallows them.
    fn send(&self, alert: &Alert) -> VigilResult<()>;
}

/// A sink that writes the rendered alert to the operational log.
///
/// The default sink when no real channel is configured — the alert is not
/// lost, it just lands in the log stream instead of an inbox.
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn send(&self, alert: &Alert) -> VigilResult<()> {
        info!(
            alert_id = %alert.id,
            category = ?alert.category,
            severity = alert.severity.label(),
            "\n{}",
            alert.render_text()
        );
        Ok(())
    }
}

/// A sink that captures alerts in memory, for tests.
#[derive(Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Alert>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All alerts delivered so far, in delivery order.
    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().expect("memory sink lock poisoned").clone()
    }
}

impl AlertSink for MemorySink {
    fn send(&self, alert: &Alert) -> VigilResult<()> {
        self.sent
            .lock()
            .expect("memory sink lock poisoned")
            .push(alert.clone());
        Ok(())
    }
}

/// Severity-gated, fire-and-forget alert dispatcher.
pub struct AlertDispatcher {
    sink: Arc<dyn AlertSink>,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// A dispatcher that renders alerts into the operational log.
    pub fn to_log() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// Apply the severity policy and, for sendable alerts, deliver on a
    /// detached thread.
    ///
    /// Policy: `Low` is dropped, `Medium` is logged but not sent, `High`
    /// and `Critical` are sent. Delivery failures are logged at error
    /// severity and swallowed — alerting is best-effort by design.
    ///
    /// Returns the delivery thread's handle for sendable alerts so tests
    /// can join it; production callers drop it.
    pub fn dispatch(&self, alert: Alert) -> Option<std::thread::JoinHandle<()>> {
        match alert.severity {
            Severity::Low => {
                debug!(title = %alert.title, "dropping low-severity alert");
                None
            }
            Severity::Medium => {
                info!(
                    title = %alert.title,
                    category = ?alert.category,
                    risk_score = ?alert.risk_score,
                    "medium-severity alert logged, not sent"
                );
                None
            }
            Severity::High | Severity::Critical => {
                let sink = Arc::clone(&self.sink);
                Some(std::thread::spawn(move || {
                    if let Err(e) = sink.send(&alert) {
                        error!(
                            alert_id = %alert.id,
                            error = %e,
                            "failed to deliver alert"
                        );
                    }
                }))
            }
        }
    }
}
