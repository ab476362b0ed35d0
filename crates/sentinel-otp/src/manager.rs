//! The OTP session lifecycle.
//!
//!   issue:  normalize phone → generate code → store session → audit → deliver
//!   verify: check code shape → look up → expiry → code → phone → delete
//!
//! A session is recorded before delivery is attempted and no store lock is
//! held while a gateway is called. A verification only succeeds if this
//! caller's `delete` is the one that removed the session, so a code can be
//! redeemed at most once even under concurrent attempts.

use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sentinel_contracts::{
    assessment::{AuditKind, AuditRecord},
    error::{SentinelError, SentinelResult},
    otp::{DeliveryChannel, IssuedOtp, OtpMessage, OtpSession, VerifiedOtp},
};
use sentinel_core::traits::{AuditWriter, Clock, SessionStore};
use sentinel_policy::OtpSettings;

use crate::{
    code::{codes_match, generate_code, is_well_formed},
    delivery::{render_body, DeliveryRoute, LocalFallbackGateway},
    phone::{mask_phone, normalize_phone, normalize_phone_lenient},
};

/// Issues and redeems one-time passcodes.
///
/// Shareable across threads behind an `Arc`; all mutable state lives in the
/// `SessionStore`.
pub struct OtpManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    settings: OtpSettings,
    route: DeliveryRoute,
    fallback: LocalFallbackGateway,
    audit: Option<Arc<dyn AuditWriter>>,
}

impl OtpManager {
    /// Build a manager. Fails with `ConfigError` if `settings` do not
    /// validate.
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        settings: OtpSettings,
        route: DeliveryRoute,
    ) -> SentinelResult<Self> {
        settings.validate()?;
        info!(
            mode = ?settings.mode,
            ttl_seconds = settings.ttl_seconds,
            route = ?route,
            "OTP manager ready"
        );
        Ok(Self {
            store,
            clock,
            settings,
            route,
            fallback: LocalFallbackGateway::new(),
            audit: None,
        })
    }

    /// Record OTP lifecycle events. A failed write fails the operation.
    pub fn with_audit(mut self, audit: Arc<dyn AuditWriter>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn settings(&self) -> &OtpSettings {
        &self.settings
    }

    /// Messages that went through the local fallback.
    pub fn fallback_deliveries(&self) -> usize {
        self.fallback.delivered()
    }

    /// Create a session for `phone` and deliver its code.
    ///
    /// Fails with `InvalidPhoneFormat` if the number is neither 10 nor 12
    /// digits. Delivery problems never fail issuance: the local fallback
    /// takes over.
    pub fn issue(&self, phone: &str) -> SentinelResult<IssuedOtp> {
        let phone = normalize_phone(phone, &self.settings.country_code)?;
        let code = generate_code(self.settings.code_length);
        let now = self.clock.now();
        let session = OtpSession {
            session_id: format!("otp_{}", Uuid::new_v4().simple()),
            otp: code.clone(),
            phone: phone.clone(),
            created_at: now,
            expires_at: now + Duration::seconds(self.settings.ttl_seconds),
        };
        let session_id = session.session_id.clone();
        let expires_at = session.expires_at;
        self.store.put(session)?;

        let recorded = self.record(
            AuditKind::OtpIssued,
            &session_id,
            json!({ "phone": mask_phone(&phone), "expires_at": expires_at }),
        );
        if let Err(e) = recorded {
            // Never leave a live code that has no audit trail.
            self.store.delete(&session_id)?;
            return Err(e);
        }

        let message = OtpMessage {
            to: phone.clone(),
            body: render_body(&code, self.settings.ttl_seconds),
        };
        let delivery = self.deliver(&message);
        let via_fallback = delivery == DeliveryChannel::LocalFallback;
        let expose = via_fallback && self.settings.mode.exposes_codes();

        info!(
            session_id = %session_id,
            phone = %mask_phone(&phone),
            fallback = via_fallback,
            "OTP issued"
        );

        Ok(IssuedOtp {
            session_id,
            message: if via_fallback {
                format!("OTP generated for {} (local delivery)", mask_phone(&phone))
            } else {
                format!("OTP sent to {}", mask_phone(&phone))
            },
            phone,
            expires_at,
            delivery,
            otp: expose.then_some(code),
        })
    }

    /// Issue a fresh session for `phone`. Earlier sessions are left to expire.
    pub fn resend(&self, phone: &str) -> SentinelResult<IssuedOtp> {
        debug!(phone = %mask_phone(phone), "OTP resend requested");
        self.issue(phone)
    }

    /// Redeem a code.
    ///
    /// Checks run in order: code shape, unknown session, expiry (which also
    /// removes the session), code, phone. A wrong code or phone leaves the
    /// session in place for another attempt.
    pub fn verify_otp(&self, session_id: &str, code: &str, phone: &str) -> SentinelResult<VerifiedOtp> {
        let length = self.settings.code_length;
        if !is_well_formed(code, length) {
            return Err(SentinelError::InvalidInput {
                reason: format!("OTP must be exactly {length} digits"),
            });
        }
        let phone = normalize_phone_lenient(phone, &self.settings.country_code);

        let Some(session) = self.store.get(session_id)? else {
            return self.reject(session_id, SentinelError::InvalidSession);
        };

        let now = self.clock.now();
        if session.is_expired_at(now) {
            self.store.delete(session_id)?;
            return self.reject(session_id, SentinelError::Expired);
        }
        if !codes_match(&session.otp, code) {
            return self.reject(session_id, SentinelError::CodeMismatch);
        }
        if session.phone != phone {
            return self.reject(session_id, SentinelError::PhoneMismatch);
        }

        // Lost a race with another verifier or a sweep.
        if self.store.delete(session_id)?.is_none() {
            return self.reject(session_id, SentinelError::InvalidSession);
        }

        self.record(
            AuditKind::OtpVerified,
            session_id,
            json!({ "phone": mask_phone(&session.phone) }),
        )?;
        info!(session_id, phone = %mask_phone(&session.phone), "OTP verified");

        Ok(VerifiedOtp {
            session_id: session_id.to_string(),
            verified_phone: session.phone,
            verified_at: now,
        })
    }

    /// Remove every expired session. Returns how many were removed.
    pub fn sweep_expired(&self) -> SentinelResult<usize> {
        let removed = self.store.sweep(self.clock.now())?;
        if removed > 0 {
            self.record(AuditKind::OtpSwept, "*", json!({ "removed": removed }))?;
            info!(removed, "expired OTP sessions swept");
        }
        Ok(removed)
    }

    /// Number of sessions currently held.
    pub fn live_sessions(&self) -> SentinelResult<usize> {
        self.store.len()
    }

    fn deliver(&self, message: &OtpMessage) -> DeliveryChannel {
        if let DeliveryRoute::Gateway(gateway) = &self.route {
            match gateway.send(message) {
                Ok(receipt) => {
                    return DeliveryChannel::Gateway {
                        provider: receipt.provider,
                        receipt_id: receipt.receipt_id,
                    };
                }
                Err(e) => {
                    warn!(
                        provider = gateway.name(),
                        to = %mask_phone(&message.to),
                        error = %e,
                        "SMS gateway failed, falling back to local delivery"
                    );
                }
            }
        }
        self.fallback.deliver(message);
        DeliveryChannel::LocalFallback
    }

    fn reject<T>(&self, session_id: &str, error: SentinelError) -> SentinelResult<T> {
        self.record(
            AuditKind::OtpRejected,
            session_id,
            json!({ "reason": format!("{error:?}") }),
        )?;
        warn!(session_id, error = %error, "OTP rejected");
        Err(error)
    }

    fn record(&self, kind: AuditKind, subject: &str, detail: serde_json::Value) -> SentinelResult<()> {
        let Some(audit) = &self.audit else {
            return Ok(());
        };
        audit.write(&AuditRecord {
            kind,
            subject: subject.to_string(),
            detail,
            timestamp: self.clock.now(),
        })
    }
}
