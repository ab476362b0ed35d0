//! In-process `SessionStore`.
//!
//! Sessions are spread over a fixed number of shards, each behind its own
//! mutex, so unrelated sessions never contend on one lock. Every trait method
//! touches at most one shard at a time and releases it before returning.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use sentinel_contracts::{
    error::{SentinelError, SentinelResult},
    otp::OtpSession,
};
use sentinel_core::traits::SessionStore;

const DEFAULT_SHARDS: usize = 16;

type Shard = Mutex<HashMap<String, OtpSession>>;

/// Sharded session table held in process memory.
pub struct InMemorySessionStore {
    shards: Vec<Shard>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// A store with `count` shards (at least one).
    pub fn with_shards(count: usize) -> Self {
        let shards = (0..count.max(1)).map(|_| Mutex::new(HashMap::new())).collect();
        Self { shards }
    }

    fn shard_for(&self, session_id: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        session_id.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(shard: &Shard) -> SentinelResult<MutexGuard<'_, HashMap<String, OtpSession>>> {
    shard.lock().map_err(|_| SentinelError::Internal {
        reason: "session store lock poisoned".to_string(),
    })
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, session: OtpSession) -> SentinelResult<()> {
        let mut shard = lock(self.shard_for(&session.session_id))?;
        if shard.contains_key(&session.session_id) {
            return Err(SentinelError::Internal {
                reason: format!("session id collision: {}", session.session_id),
            });
        }
        shard.insert(session.session_id.clone(), session);
        Ok(())
    }

    fn get(&self, session_id: &str) -> SentinelResult<Option<OtpSession>> {
        Ok(lock(self.shard_for(session_id))?.get(session_id).cloned())
    }

    fn delete(&self, session_id: &str) -> SentinelResult<Option<OtpSession>> {
        Ok(lock(self.shard_for(session_id))?.remove(session_id))
    }

    fn sweep(&self, now: DateTime<Utc>) -> SentinelResult<usize> {
        let mut removed = 0;
        for shard in &self.shards {
            let mut shard = lock(shard)?;
            let before = shard.len();
            shard.retain(|_, session| !session.is_expired_at(now));
            removed += before - shard.len();
        }
        debug!(removed, "session sweep pass");
        Ok(removed)
    }

    fn len(&self) -> SentinelResult<usize> {
        let mut total = 0;
        for shard in &self.shards {
            total += lock(shard)?.len();
        }
        Ok(total)
    }
}
