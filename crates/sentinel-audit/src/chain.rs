//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. stream id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the record

use sha2::{Digest, Sha256};

use sentinel_contracts::{
    assessment::AuditRecord,
    error::{SentinelError, SentinelResult},
};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single audit event.
///
/// Returns a lowercase 64-character hex string, or `AuditWriteFailed` if the
/// record cannot be serialized.
pub fn hash_event(
    stream_id: &str,
    sequence: u64,
    record: &AuditRecord,
    prev_hash: &str,
) -> SentinelResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| SentinelError::AuditWriteFailed {
        reason: format!("audit record is not serializable: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(stream_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every event links to its predecessor (or to `GENESIS_HASH`)
/// and every stored hash matches the recomputed one. An empty chain is
/// valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(&event.stream_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
