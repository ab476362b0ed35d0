//! Error taxonomy for the Sentinel engine.
//!
//! All fallible operations return `SentinelResult<T>`. The OTP variants carry
//! the guidance text shown to the end user verbatim, so their `Display`
//! output is part of the contract.

use thiserror::Error;

/// The unified error type for the Sentinel crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentinelError {
    /// A required field was missing, blank, or malformed. Rejected before
    /// any scoring takes place.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The phone number did not normalize to a 10-digit national or a
    /// 12-digit international number.
    #[error("Invalid phone number format. Expected 10-digit number (got {digits} digits).")]
    InvalidPhoneFormat { digits: usize },

    /// No live OTP session exists under the given id (never issued, already
    /// consumed, or swept).
    #[error("Session expired or not found. Please request a new OTP.")]
    InvalidSession,

    /// The session existed but its expiry had passed. The session is gone.
    #[error("OTP expired. Please request a new OTP.")]
    Expired,

    /// The submitted code did not match. The session is kept for retry.
    #[error("Invalid OTP. Please try again.")]
    CodeMismatch,

    /// The submitted phone did not match the session's phone. The session is
    /// kept for retry.
    #[error("Phone number mismatch.")]
    PhoneMismatch,

    /// An SMS gateway could not deliver a message.
    ///
    /// Recovered inside the OTP manager by falling back to local delivery;
    /// never surfaced to the issuing caller.
    #[error("delivery failed: {reason}")]
    DeliveryFailed { reason: String },

    /// The audit writer could not persist a record.
    ///
    /// Fatal for the operation being audited: an unrecorded decision is not
    /// returned to the caller.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// A scoring policy or runtime setting is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An unexpected fault inside the engine (poisoned lock, store fault,
    /// broken invariant). Distinct from every domain outcome above.
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl SentinelError {
    /// True for rejections that leave the OTP session in place, so the
    /// caller may try again before expiry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CodeMismatch | Self::PhoneMismatch)
    }

    /// True for errors caused by malformed caller input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::InvalidPhoneFormat { .. })
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the Sentinel crates.
pub type SentinelResult<T> = Result<T, SentinelError>;
