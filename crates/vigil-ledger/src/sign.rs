//! Signature engine: keyed entry signatures and chain-hash derivation.
//!
//! Two pure functions make every entry tamper-evident:
//!
//! - [`sign_entry`] — HMAC-SHA256 over the entry's canonical fields, keyed
//!   with the shared secret. Deterministic: identical fields and key always
//!   produce the identical hex signature.
//! - [`chain_hash`] — plain SHA-256 over the previous entry's
//!   `signature + ISO-8601 timestamp`, producing the next entry's
//!   `previous_hash`.
//!
//! Signature input layout (bytes, in order, each field preceded by its
//! length as 8 bytes little-endian — an in-band separator would let bytes
//! migrate across the boundary of a field that happens to contain it):
//!   1.  sequence as 8-byte little-endian
//!   2.  timestamp as RFC 3339 with milliseconds and `Z` suffix
//!   3.  event_type as UTF-8
//!   4.  user_id as UTF-8 (empty when absent)
//!   5.  action as UTF-8
//!   6.  resource as UTF-8
//!   7.  resource_id as UTF-8 (empty when absent)
//!   8.  result as its lowercase serde name
//!   9.  error_message as UTF-8 (empty when absent)
//!   10. risk_score as a decimal string (empty when absent)
//!   11. canonical JSON of changes (empty when absent)
//!   12. canonical JSON of metadata
//!
//! `signature` itself and `previous_hash` are excluded: the chain linkage
//! is committed to by [`chain_hash`], not by the entry signature, so the
//! two integrity mechanisms stay independently recomputable.

use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use vigil_contracts::{
    entry::{AuditEntry, EventResult},
    error::{VigilError, VigilResult},
};

type HmacSha256 = Hmac<Sha256>;

/// The shared secret used to key entry signatures.
///
/// Constructed once at startup. An empty or placeholder key is a fatal
/// configuration error — the ledger refuses to exist without a real key
/// rather than silently writing unverifiable entries.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Minimum accepted key length in bytes.
    pub const MIN_KEY_LEN: usize = 16;

    /// Build a key from raw bytes, rejecting anything shorter than
    /// [`Self::MIN_KEY_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> VigilResult<Self> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_KEY_LEN {
            return Err(VigilError::ConfigError {
                reason: format!(
                    "signing key must be at least {} bytes, got {}",
                    Self::MIN_KEY_LEN,
                    bytes.len()
                ),
            });
        }
        Ok(Self(bytes))
    }

    /// Build a key from a configuration string (e.g. an environment
    /// variable), applying the same length check.
    pub fn from_config_str(s: &str) -> VigilResult<Self> {
        Self::new(s.as_bytes().to_vec())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    /// Never print key material, even in debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey({} bytes)", self.0.len())
    }
}

/// Render a timestamp the way the chain commits to it: RFC 3339 with
/// milliseconds and a `Z` suffix, e.g. `2026-08-29T12:00:00.000Z`.
pub fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Compute the keyed signature for an entry's canonical fields.
///
/// The `signature` and `previous_hash` fields of `entry` are ignored, so
/// this function serves both signing at append time (when those fields are
/// still empty) and recomputation during verification.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if the metadata or change set cannot be serialized to JSON —
/// which cannot happen for the well-formed contract types.
pub fn sign_entry(key: &SigningKey, entry: &AuditEntry) -> String {
    // HMAC-SHA256 accepts keys of any length; new_from_slice cannot fail.
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");

    // Length-prefix every field so the framing is unambiguous no matter
    // what bytes the field contents contain.
    let mut feed = |bytes: &[u8]| {
        mac.update(&(bytes.len() as u64).to_le_bytes());
        mac.update(bytes);
    };

    feed(&entry.sequence.to_le_bytes());
    feed(iso_timestamp(entry.timestamp).as_bytes());
    feed(entry.event_type.as_bytes());
    feed(entry.user_id.as_deref().unwrap_or("").as_bytes());
    feed(entry.action.as_bytes());
    feed(entry.resource.as_bytes());
    feed(entry.resource_id.as_deref().unwrap_or("").as_bytes());
    feed(result_tag(entry.result).as_bytes());
    feed(entry.error_message.as_deref().unwrap_or("").as_bytes());
    let risk = entry
        .risk_score
        .map(|s| s.to_string())
        .unwrap_or_default();
    feed(risk.as_bytes());
    let changes = entry
        .changes
        .as_ref()
        .map(|c| serde_json::to_vec(c).expect("ChangeSet must always serialize to JSON"))
        .unwrap_or_default();
    feed(&changes);
    let metadata =
        serde_json::to_vec(&entry.metadata).expect("EventMetadata must always serialize to JSON");
    feed(&metadata);

    hex::encode(mac.finalize().into_bytes())
}

/// Derive the `previous_hash` for the entry that follows one with the
/// given `signature` and `timestamp`.
///
/// Plain SHA-256 over the UTF-8 concatenation of the signature and the
/// ISO-8601 timestamp. Returns a lowercase 64-character hex string.
pub fn chain_hash(signature: &str, timestamp: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signature.as_bytes());
    hasher.update(iso_timestamp(timestamp).as_bytes());
    hex::encode(hasher.finalize())
}

fn result_tag(result: EventResult) -> &'static str {
    match result {
        EventResult::Success => "success",
        EventResult::Failure => "failure",
        EventResult::Partial => "partial",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use vigil_contracts::entry::EventMetadata;

    use super::*;

    fn key() -> SigningKey {
        SigningKey::from_config_str("unit-test-signing-key-0123456789").unwrap()
    }

    fn entry() -> AuditEntry {
        AuditEntry {
            sequence: 3,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap(),
            event_type: "payment.initiated".to_string(),
            user_id: Some("user-1".to_string()),
            action: "initiated".to_string(),
            resource: "payment".to_string(),
            resource_id: Some("order-5".to_string()),
            changes: None,
            metadata: EventMetadata {
                amount: Some(99.0),
                currency: Some("USD".to_string()),
                ..EventMetadata::default()
            },
            result: EventResult::Success,
            error_message: None,
            risk_score: None,
            signature: String::new(),
            previous_hash: None,
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let a = sign_entry(&key(), &entry());
        let b = sign_entry(&key(), &entry());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64, "HMAC-SHA256 hex must be 64 chars");
    }

    #[test]
    fn any_field_change_changes_the_signature() {
        let base = sign_entry(&key(), &entry());

        let mut changed = entry();
        changed.event_type = "payment.failed".to_string();
        assert_ne!(sign_entry(&key(), &changed), base);

        let mut changed = entry();
        changed.risk_score = Some(40);
        assert_ne!(sign_entry(&key(), &changed), base);

        let mut changed = entry();
        changed.metadata.amount = Some(100.0);
        assert_ne!(sign_entry(&key(), &changed), base);
    }

    #[test]
    fn control_bytes_cannot_migrate_across_field_boundaries() {
        // Two distinct (action, resource) pairs whose concatenation is
        // byte-identical when a 0x1F inside a field is mistaken for a
        // field boundary. Length-prefixed framing must keep them apart.
        let mut left = entry();
        left.action = "a\u{1f}b".to_string();
        left.resource = "c".to_string();

        let mut right = entry();
        right.action = "a".to_string();
        right.resource = "b\u{1f}c".to_string();

        assert_ne!(sign_entry(&key(), &left), sign_entry(&key(), &right));

        let mut shifted = entry();
        shifted.action = "a\u{1f}bc".to_string();
        shifted.resource = String::new();
        assert_ne!(sign_entry(&key(), &left), sign_entry(&key(), &shifted));
    }

    #[test]
    fn signature_ignores_chain_fields() {
        let base = sign_entry(&key(), &entry());

        let mut with_chain = entry();
        with_chain.signature = "ff".repeat(32);
        with_chain.previous_hash = Some("aa".repeat(32));
        assert_eq!(sign_entry(&key(), &with_chain), base);
    }

    #[test]
    fn different_keys_produce_different_signatures() {
        let other = SigningKey::from_config_str("another-signing-key-abcdefghij").unwrap();
        assert_ne!(sign_entry(&key(), &entry()), sign_entry(&other, &entry()));
    }

    #[test]
    fn short_key_is_a_config_error() {
        match SigningKey::from_config_str("short") {
            Err(vigil_contracts::VigilError::ConfigError { reason }) => {
                assert!(reason.contains("at least"));
            }
            other => panic!("expected ConfigError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn iso_timestamp_matches_javascript_to_iso_string() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        assert_eq!(iso_timestamp(ts), "2026-08-29T12:00:00.000Z");
    }

    #[test]
    fn chain_hash_is_sha256_of_signature_and_iso_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let sig = "ab".repeat(32);
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(sig.as_bytes());
            hasher.update(b"2026-08-29T12:00:00.000Z");
            hex::encode(hasher.finalize())
        };
        assert_eq!(chain_hash(&sig, ts), expected);
    }
}
