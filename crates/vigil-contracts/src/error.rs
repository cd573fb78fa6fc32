//! Error types for the VIGIL audit and fraud-detection pipeline.
//!
//! All fallible operations across the VIGIL crates return `VigilResult<T>`.
//! Error variants carry enough context to produce actionable operational
//! log lines.

use thiserror::Error;

/// The unified error type for the VIGIL crates.
#[derive(Debug, Error)]
pub enum VigilError {
    /// A required configuration value is missing or invalid.
    ///
    /// Raised at startup, never mid-flight: a ledger without a signing key
    /// must refuse to start rather than silently write unsigned entries.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The ledger could not persist an entry.
    ///
    /// Callers on the business write path must log this at error severity
    /// and continue; audit logging is best-effort relative to the primary
    /// transaction.
    #[error("audit append failed: {reason}")]
    AppendFailed { reason: String },

    /// A ledger read (query or statistics) failed.
    ///
    /// Read failures surface to the caller — there is no side effect to
    /// protect on the read path.
    #[error("audit query failed: {reason}")]
    QueryFailed { reason: String },

    /// An update or delete was attempted on an existing ledger entry.
    ///
    /// Entries are write-once; the store rejects mutation unconditionally.
    #[error("audit entry {sequence} is immutable and cannot be modified")]
    ImmutableEntry { sequence: u64 },

    /// An outbound alert could not be delivered.
    ///
    /// Always swallowed after logging by the dispatcher; exposed so sinks
    /// can report delivery failures upward to the dispatch layer.
    #[error("alert dispatch failed: {reason}")]
    AlertDispatchFailed { reason: String },
}

/// Convenience alias used throughout the VIGIL crates.
pub type VigilResult<T> = Result<T, VigilError>;
