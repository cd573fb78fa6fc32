//! # vigil-ledger
//!
//! Append-only, HMAC-signed, SHA-256 hash-chained audit ledger.
//!
//! ## Overview
//!
//! Every business event is wrapped in an [`AuditEntry`](vigil_contracts::AuditEntry)
//! that is signed with a shared secret and linked to its predecessor via a
//! chain hash. Tampering with any stored entry — even a single byte —
//! breaks signature recomputation or the chain linkage, and
//! [`verify_chain`] reports exactly which.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vigil_ledger::{InMemoryLedger, SigningKey};
//!
//! let key = SigningKey::from_config_str(&std::env::var("VIGIL_SIGNING_KEY")?)?;
//! let ledger = InMemoryLedger::new(key);
//!
//! ledger.record(NewEntry::new("auth.login", "authentication", EventResult::Success));
//! assert!(ledger.verify_integrity(1000).is_intact());
//! ```

pub mod chain;
pub mod memory;
pub mod report;
pub mod sign;

pub use chain::{verify_chain, ChainStatus};
pub use memory::{InMemoryLedger, DEFAULT_VERIFY_LIMIT};
pub use report::{security_metrics, SecurityMetrics, TimeRange};
pub use sign::{chain_hash, iso_timestamp, sign_entry, SigningKey};

// ── Tests ─────────────────────────────────────────────────────────────────────
