//! Audit event and log types.
//!
//! `AuditEvent` wraps an `AuditRecord` with its position in the chain and the
//! hashes that make tampering detectable. `AuditLog` is the sealed export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentinel_contracts::assessment::AuditRecord;

/// A single entry in the hash chain.
///
/// Changing any field, including inside `record`, invalidates `this_hash`
/// and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,
    /// The audit stream this event belongs to (one per engine instance).
    pub stream_id: String,
    pub record: AuditRecord,
    /// Hash of the previous event, or `GENESIS_HASH`.
    pub prev_hash: String,
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed export of one audit stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub stream_id: String,
    pub events: Vec<AuditEvent>,
    pub exported_at: DateTime<Utc>,
    /// `this_hash` of the last event; empty for an empty log.
    pub terminal_hash: String,
    /// True once `finalize` has been called on the writer.
    pub sealed: bool,
}
