//! # vigil-alert
//!
//! Out-of-band security alert dispatch.
//!
//! Converts high-risk findings into rendered notifications and delivers
//! them through an [`AlertSink`] without ever blocking or failing the
//! caller: dispatch is fire-and-forget and delivery errors are swallowed
//! after logging.

pub mod alert;
pub mod dispatch;

pub use alert::{Alert, AlertCategory, Severity};
pub use dispatch::{AlertDispatcher, AlertSink, MemorySink, TracingSink};

// ── Tests ─────────────────────────────────────────────────────────────────────
