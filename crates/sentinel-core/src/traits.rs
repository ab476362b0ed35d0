//! Collaborator trait definitions.
//!
//! These four traits are the seams between the engine and the outside world:
//!
//! - `SessionStore`: the OTP session table (in-memory or external KV)
//! - `Clock`: the time source, injectable for deterministic tests
//! - `SmsGateway`: an outbound SMS carrier
//! - `AuditWriter`: the append-only decision record
//!
//! Scoring itself needs none of them; it is pure.

use chrono::{DateTime, Utc};

use sentinel_contracts::{
    assessment::AuditRecord,
    error::SentinelResult,
    otp::{DeliveryReceipt, OtpMessage, OtpSession},
};

/// The OTP session table.
///
/// Every method is one atomic step. Implementations must be safe to call
/// from many threads at once. `delete` hands back the removed session so
/// that exactly one concurrent caller can observe a successful removal.
pub trait SessionStore: Send + Sync {
    /// Record a new session. Fails with `Internal` if the id is already live.
    fn put(&self, session: OtpSession) -> SentinelResult<()>;

    /// Look up a session without changing it.
    fn get(&self, session_id: &str) -> SentinelResult<Option<OtpSession>>;

    /// Remove a session, returning it if it was present.
    fn delete(&self, session_id: &str) -> SentinelResult<Option<OtpSession>>;

    /// Remove every session whose expiry is before `now`. Returns how many
    /// were removed. Idempotent.
    fn sweep(&self, now: DateTime<Utc>) -> SentinelResult<usize>;

    /// Number of live sessions.
    fn len(&self) -> SentinelResult<usize>;

    fn is_empty(&self) -> SentinelResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// The time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// An outbound SMS carrier.
///
/// Timeouts and retries belong to the implementation. A failed send returns
/// `DeliveryFailed`; the caller decides whether to fall back.
pub trait SmsGateway: Send + Sync {
    /// Short provider name used in logs and delivery receipts.
    fn name(&self) -> &str;

    fn send(&self, message: &OtpMessage) -> SentinelResult<DeliveryReceipt>;
}

/// The audit writer: the immutable record of decisions and OTP events.
///
/// A failed write is fatal to the operation being recorded: the engine
/// returns `AuditWriteFailed` instead of an unrecorded result.
pub trait AuditWriter: Send + Sync {
    /// Append one record. Records are never modified or deleted.
    fn write(&self, record: &AuditRecord) -> SentinelResult<()>;

    /// Seal the log. Called once at shutdown.
    fn finalize(&self) -> SentinelResult<()>;
}
