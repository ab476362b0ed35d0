//! One-time-passcode session records.
//!
//! An `OtpSession` is owned by the session table; callers only ever see the
//! `IssuedOtp` returned at issuance and the `VerifiedOtp` returned on
//! success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live OTP session as held by a `SessionStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSession {
    /// Opaque, unique identifier handed to the caller.
    pub session_id: String,
    /// Numeric code, exactly `code_length` ASCII digits.
    pub otp: String,
    /// Normalized phone number, e.g. `+919876543210`.
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpSession {
    /// True once `now` is strictly past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Which path actually carried the code to the phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// The configured carrier gateway accepted the message.
    Gateway { provider: String, receipt_id: String },
    /// The local fallback path was used (no gateway configured, or the
    /// gateway failed).
    LocalFallback,
}

/// Response to a successful `issue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedOtp {
    pub session_id: String,
    pub phone: String,
    pub expires_at: DateTime<Utc>,
    pub delivery: DeliveryChannel,
    pub message: String,
    /// The plaintext code. Only ever `Some` outside production and only for
    /// local fallback delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

/// Response to a successful `verify_otp`. The session no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedOtp {
    pub session_id: String,
    pub verified_phone: String,
    pub verified_at: DateTime<Utc>,
}

/// Text message handed to an SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpMessage {
    pub to: String,
    pub body: String,
}

/// Acknowledgement from an SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub provider: String,
    pub receipt_id: String,
}
