//! Chain integrity verification.
//!
//! [`verify_chain`] walks a window of entries in ascending append order and
//! checks three rules per entry:
//!
//! 1. **Linkage** — `previous_hash` equals [`chain_hash`] of the preceding
//!    entry (`None` for the first entry ever appended).
//! 2. **Signature** — the stored signature equals [`sign_entry`] recomputed
//!    from the entry's own fields and the shared key.
//! 3. **Well-formedness** — the stored hash strings are plausible SHA-256
//!    hex; a record that is structurally broken is reported as malformed,
//!    not as a mismatch.
//!
//! The outcome is a tagged [`ChainStatus`], not a bare boolean: "an entry
//! was altered" and "an entry is garbage" are different incidents and admin
//! tooling needs to tell them apart. `ChainStatus::is_intact()` gives the
//! boolean view.

use vigil_contracts::entry::AuditEntry;

use crate::sign::{chain_hash, sign_entry, SigningKey};

/// Expected length of a hex-encoded SHA-256 digest.
const HEX_DIGEST_LEN: usize = 64;

/// The outcome of a chain-verification walk.
///
/// Any variant other than `Intact` is a critical, alertable condition: the
/// ledger has detected tampering or corruption, and that detection is the
/// actionable signal — not an error to catch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    /// Every link and signature in the inspected window is valid.
    Intact {
        /// Number of entries inspected.
        checked: usize,
    },
    /// An entry's `previous_hash` does not match the chain hash of the
    /// entry before it.
    LinkMismatch { sequence: u64 },
    /// An entry's stored signature does not match the value recomputed
    /// from its own fields and the shared key.
    SignatureMismatch { sequence: u64 },
    /// An entry is structurally broken (e.g. a hash field that is not
    /// 64 hex characters) and cannot be meaningfully verified.
    MalformedRecord { sequence: u64, reason: String },
}

impl ChainStatus {
    /// Boolean view for callers that only need the go/no-go answer.
    pub fn is_intact(&self) -> bool {
        matches!(self, ChainStatus::Intact { .. })
    }

    /// Number of entries inspected, regardless of outcome. For failures
    /// this is the count up to and including the offending entry.
    pub fn checked(&self) -> usize {
        match self {
            ChainStatus::Intact { checked } => *checked,
            ChainStatus::LinkMismatch { sequence }
            | ChainStatus::SignatureMismatch { sequence }
            | ChainStatus::MalformedRecord { sequence, .. } => *sequence as usize + 1,
        }
    }
}

fn well_formed_hex(s: &str) -> bool {
    s.len() == HEX_DIGEST_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verify a window of entries in ascending append order.
///
/// `entries` must start at the genesis entry (sequence 0) for the first
/// entry's `previous_hash = None` rule to apply; the store's
/// `verify_integrity` always hands over a prefix of the ledger. An empty
/// window is defined as intact.
pub fn verify_chain(key: &SigningKey, entries: &[AuditEntry]) -> ChainStatus {
    let mut previous: Option<&AuditEntry> = None;

    for entry in entries {
        if !well_formed_hex(&entry.signature) {
            return ChainStatus::MalformedRecord {
                sequence: entry.sequence,
                reason: "signature is not a 64-character hex digest".to_string(),
            };
        }
        if let Some(ref ph) = entry.previous_hash {
            if !well_formed_hex(ph) {
                return ChainStatus::MalformedRecord {
                    sequence: entry.sequence,
                    reason: "previous_hash is not a 64-character hex digest".to_string(),
                };
            }
        }

        // Rule 1: linkage to the preceding entry (None at genesis).
        let expected_prev = previous.map(|p| chain_hash(&p.signature, p.timestamp));
        if entry.previous_hash != expected_prev {
            return ChainStatus::LinkMismatch {
                sequence: entry.sequence,
            };
        }

        // Rule 2: the signature must be recomputable from the entry itself.
        if sign_entry(key, entry) != entry.signature {
            return ChainStatus::SignatureMismatch {
                sequence: entry.sequence,
            };
        }

        previous = Some(entry);
    }

    ChainStatus::Intact {
        checked: entries.len(),
    }
}
