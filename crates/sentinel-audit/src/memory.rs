//! In-memory implementation of `AuditWriter`.
//!
//! Events live in a `Vec` behind a `Mutex`, so the engine and the OTP
//! manager can share one writer across threads. Once finalized the writer
//! refuses further records.

use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, info};

use sentinel_contracts::{
    assessment::AuditRecord,
    error::{SentinelError, SentinelResult},
};
use sentinel_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

pub(crate) struct InMemoryState {
    pub(crate) events: Vec<AuditEvent>,
    pub(crate) last_hash: String,
    pub(crate) sealed: bool,
}

/// An in-memory, append-only audit writer backed by a SHA-256 hash chain.
pub struct InMemoryAuditWriter {
    stream_id: String,
    pub(crate) state: Mutex<InMemoryState>,
}

impl InMemoryAuditWriter {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            state: Mutex::new(InMemoryState {
                events: Vec::new(),
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
                sealed: false,
            }),
        }
    }

    fn lock(&self) -> SentinelResult<std::sync::MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| SentinelError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }

    /// Export every event written so far.
    pub fn export_log(&self) -> SentinelResult<AuditLog> {
        let state = self.lock()?;
        Ok(AuditLog {
            stream_id: self.stream_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash: state
                .events
                .last()
                .map(|e| e.this_hash.clone())
                .unwrap_or_default(),
            sealed: state.sealed,
        })
    }

    /// Re-verify the in-memory chain. A poisoned lock counts as a failure.
    pub fn verify_integrity(&self) -> bool {
        match self.lock() {
            Ok(state) => verify_chain(&state.events),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditWriter for InMemoryAuditWriter {
    fn write(&self, record: &AuditRecord) -> SentinelResult<()> {
        let mut state = self.lock()?;
        if state.sealed {
            return Err(SentinelError::AuditWriteFailed {
                reason: format!("audit stream '{}' is sealed", self.stream_id),
            });
        }

        let sequence = state.events.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_event(&self.stream_id, sequence, record, &prev_hash)?;

        debug!(sequence, kind = ?record.kind, subject = %record.subject, "audit record appended");

        state.events.push(AuditEvent {
            sequence,
            stream_id: self.stream_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;
        Ok(())
    }

    fn finalize(&self) -> SentinelResult<()> {
        let mut state = self.lock()?;
        state.sealed = true;
        info!(
            stream_id = %self.stream_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "audit stream sealed"
        );
        Ok(())
    }
}
