//! # sentinel-otp
//!
//! One-time-passcode sessions for Sentinel.
//!
//! This crate provides:
//! - `OtpManager`: issue, resend, single-use verify and expiry sweep
//! - `InMemorySessionStore`: a sharded, thread-safe `SessionStore`
//! - `DeliveryRoute` and `LocalFallbackGateway`: carrier selection with an
//!   always-available local path
//! - Phone number normalization and masking
//!
//! Codes are never written to logs or audit records. The plaintext code is
//! only returned to the caller in development mode, and only when the local
//! fallback carried it.

pub mod code;
pub mod delivery;
pub mod manager;
pub mod phone;
pub mod store;

pub use delivery::{DeliveryRoute, LocalFallbackGateway};
pub use manager::OtpManager;
pub use store::InMemorySessionStore;

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{mpsc, Arc, Barrier, Mutex};
    use std::thread;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, TimeZone, Utc};

    use sentinel_contracts::{
        assessment::{AuditKind, AuditRecord},
        error::{SentinelError, SentinelResult},
        otp::{DeliveryChannel, DeliveryReceipt, OtpMessage},
    };
    use sentinel_core::{
        clock::ManualClock,
        traits::{AuditWriter, SessionStore, SmsGateway},
    };
    use sentinel_policy::{DeploymentMode, OtpSettings};

    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct MockAudit {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl MockAudit {
        fn kinds(&self) -> Vec<AuditKind> {
            self.records.lock().unwrap().iter().map(|r| r.kind).collect()
        }
    }

    impl AuditWriter for MockAudit {
        fn write(&self, record: &AuditRecord) -> SentinelResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn finalize(&self) -> SentinelResult<()> {
            Ok(())
        }
    }

    struct BrokenAudit;

    impl AuditWriter for BrokenAudit {
        fn write(&self, _record: &AuditRecord) -> SentinelResult<()> {
            Err(SentinelError::AuditWriteFailed {
                reason: "disk full".to_string(),
            })
        }

        fn finalize(&self) -> SentinelResult<()> {
            Ok(())
        }
    }

    /// A carrier that records what it was asked to send.
    #[derive(Default)]
    struct CapturingGateway {
        sent: Arc<Mutex<Vec<OtpMessage>>>,
    }

    impl SmsGateway for CapturingGateway {
        fn name(&self) -> &str {
            "carrier"
        }

        fn send(&self, message: &OtpMessage) -> SentinelResult<DeliveryReceipt> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(DeliveryReceipt {
                provider: "carrier".to_string(),
                receipt_id: "SM123".to_string(),
            })
        }
    }

    struct DownGateway;

    impl SmsGateway for DownGateway {
        fn name(&self) -> &str {
            "carrier"
        }

        fn send(&self, _message: &OtpMessage) -> SentinelResult<DeliveryReceipt> {
            Err(SentinelError::DeliveryFailed {
                reason: "carrier timeout".to_string(),
            })
        }
    }

    /// A carrier that parks inside `send` until the test releases it.
    struct ParkedGateway {
        entered: Arc<Barrier>,
        release: Arc<Barrier>,
    }

    impl SmsGateway for ParkedGateway {
        fn name(&self) -> &str {
            "carrier"
        }

        fn send(&self, _message: &OtpMessage) -> SentinelResult<DeliveryReceipt> {
            self.entered.wait();
            self.release.wait();
            Ok(DeliveryReceipt {
                provider: "carrier".to_string(),
                receipt_id: "SM-parked".to_string(),
            })
        }
    }

    const PHONE: &str = "9876543210";

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    struct Harness {
        manager: Arc<OtpManager>,
        clock: Arc<ManualClock>,
        store: Arc<InMemorySessionStore>,
        audit: Arc<MockAudit>,
    }

    fn harness(settings: OtpSettings, route: DeliveryRoute) -> Harness {
        let clock = Arc::new(ManualClock::new(start()));
        let store = Arc::new(InMemorySessionStore::new());
        let audit = Arc::new(MockAudit::default());
        let manager = OtpManager::new(store.clone(), clock.clone(), settings, route)
            .unwrap()
            .with_audit(audit.clone());
        Harness {
            manager: Arc::new(manager),
            clock,
            store,
            audit,
        }
    }

    fn dev() -> Harness {
        harness(OtpSettings::development(), DeliveryRoute::FallbackOnly)
    }

    /// Read the code straight from the store, as the customer's phone would.
    fn code_for(h: &Harness, session_id: &str) -> String {
        h.store.get(session_id).unwrap().unwrap().otp
    }

    // ── Issue ────────────────────────────────────────────────────────────────

    #[test]
    fn issue_creates_a_live_session() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();

        assert!(issued.session_id.starts_with("otp_"));
        assert_eq!(issued.phone, "+919876543210");
        assert_eq!(issued.expires_at, start() + Duration::seconds(300));
        assert_eq!(issued.delivery, DeliveryChannel::LocalFallback);
        assert_eq!(h.manager.live_sessions().unwrap(), 1);
        assert_eq!(h.manager.fallback_deliveries(), 1);
    }

    #[test]
    fn development_fallback_exposes_code() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.clone().unwrap();
        assert_eq!(code.len(), 6);
        assert_eq!(code, code_for(&h, &issued.session_id));
    }

    #[test]
    fn production_never_exposes_code() {
        let h = harness(OtpSettings::default(), DeliveryRoute::FallbackOnly);
        assert_eq!(h.manager.settings().mode, DeploymentMode::Production);
        let issued = h.manager.issue(PHONE).unwrap();
        assert_eq!(issued.delivery, DeliveryChannel::LocalFallback);
        assert!(issued.otp.is_none());
        let json = serde_json::to_value(&issued).unwrap();
        assert!(json.get("otp").is_none());
    }

    #[test]
    fn gateway_delivery_never_exposes_code() {
        let gateway = CapturingGateway::default();
        let sent = gateway.sent.clone();
        let h = harness(OtpSettings::development(), DeliveryRoute::Gateway(Box::new(gateway)));

        let issued = h.manager.issue(PHONE).unwrap();
        assert!(issued.otp.is_none());
        assert_eq!(
            issued.delivery,
            DeliveryChannel::Gateway {
                provider: "carrier".to_string(),
                receipt_id: "SM123".to_string(),
            }
        );

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+919876543210");
        assert!(sent[0].body.contains(&code_for(&h, &issued.session_id)));
        assert_eq!(h.manager.fallback_deliveries(), 0);
    }

    #[test]
    fn failing_gateway_falls_back_and_session_stays_usable() {
        let h = harness(OtpSettings::development(), DeliveryRoute::Gateway(Box::new(DownGateway)));
        let issued = h.manager.issue(PHONE).unwrap();
        assert_eq!(issued.delivery, DeliveryChannel::LocalFallback);
        assert_eq!(h.manager.fallback_deliveries(), 1);

        let code = issued.otp.unwrap();
        let verified = h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap();
        assert_eq!(verified.verified_phone, "+919876543210");
    }

    #[test]
    fn session_is_usable_while_gateway_send_is_in_flight() {
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let gateway = ParkedGateway {
            entered: entered.clone(),
            release: release.clone(),
        };
        let h = harness(OtpSettings::development(), DeliveryRoute::Gateway(Box::new(gateway)));

        let issuer = {
            let manager = h.manager.clone();
            thread::spawn(move || manager.issue(PHONE))
        };
        entered.wait();

        // The session was recorded before delivery began.
        let session_id = {
            let records = h.audit.records.lock().unwrap();
            let issued = records
                .iter()
                .find(|r| r.kind == AuditKind::OtpIssued)
                .expect("issue recorded before delivery");
            issued.subject.clone()
        };
        let code = code_for(&h, &session_id);

        // Store operations complete while the gateway is still parked. A
        // held shard lock would stall the worker and trip the timeout.
        let (tx, rx) = mpsc::channel();
        {
            let manager = h.manager.clone();
            let session_id = session_id.clone();
            thread::spawn(move || {
                let swept = manager.sweep_expired();
                let verified = manager.verify_otp(&session_id, &code, PHONE);
                let _ = tx.send((swept, verified));
            });
        }
        let (swept, verified) = rx
            .recv_timeout(StdDuration::from_secs(5))
            .expect("store stayed locked during gateway send");
        assert_eq!(swept.unwrap(), 0);
        assert_eq!(verified.unwrap().session_id, session_id);

        release.wait();
        let issued = issuer.join().unwrap().unwrap();
        assert_eq!(issued.session_id, session_id);
        assert!(matches!(issued.delivery, DeliveryChannel::Gateway { .. }));
        assert!(issued.otp.is_none());
        assert_eq!(h.manager.live_sessions().unwrap(), 0);
    }

    #[test]
    fn invalid_settings_are_rejected_at_construction() {
        for settings in [
            OtpSettings {
                code_length: 0,
                ..OtpSettings::development()
            },
            OtpSettings {
                ttl_seconds: 0,
                ..OtpSettings::development()
            },
        ] {
            let result = OtpManager::new(
                Arc::new(InMemorySessionStore::new()),
                Arc::new(ManualClock::new(start())),
                settings,
                DeliveryRoute::FallbackOnly,
            );
            assert!(matches!(result, Err(SentinelError::ConfigError { .. })));
        }
    }

    #[test]
    fn invalid_phone_formats_are_rejected() {
        let h = dev();
        for bad in ["", "12345", "98765432101", "+1 (415) 555-01234"] {
            let err = h.manager.issue(bad).unwrap_err();
            assert!(matches!(err, SentinelError::InvalidPhoneFormat { .. }), "{bad:?}");
        }
        assert_eq!(h.manager.live_sessions().unwrap(), 0);
    }

    #[test]
    fn twelve_digit_numbers_keep_their_country_code() {
        let h = dev();
        assert_eq!(h.manager.issue("+44 7911 123456").unwrap().phone, "+447911123456");
        assert_eq!(h.manager.issue("+91 98765 43210").unwrap().phone, "+919876543210");
    }

    #[test]
    fn session_ids_are_unique() {
        let h = dev();
        let a = h.manager.issue(PHONE).unwrap();
        let b = h.manager.resend(PHONE).unwrap();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(h.manager.live_sessions().unwrap(), 2);
    }

    #[test]
    fn audit_failure_on_issue_leaves_no_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let manager = OtpManager::new(
            store.clone(),
            Arc::new(ManualClock::new(start())),
            OtpSettings::development(),
            DeliveryRoute::FallbackOnly,
        )
        .unwrap()
        .with_audit(Arc::new(BrokenAudit));

        let err = manager.issue(PHONE).unwrap_err();
        assert!(matches!(err, SentinelError::AuditWriteFailed { .. }));
        assert!(store.is_empty().unwrap());
        assert_eq!(manager.fallback_deliveries(), 0);
    }

    #[test]
    fn audit_records_never_contain_codes() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.clone().unwrap();
        let _ = h.manager.verify_otp(&issued.session_id, "000000", PHONE);
        h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap();

        let records = h.audit.records.lock().unwrap();
        assert!(!records.is_empty());
        for record in records.iter() {
            let text = record.detail.to_string();
            assert!(!text.contains(&code), "code leaked into {:?}", record.kind);
            assert!(!text.contains("9876543210"), "full phone in {:?}", record.kind);
        }
    }

    // ── Verify ───────────────────────────────────────────────────────────────

    #[test]
    fn correct_code_verifies_once() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();

        let verified = h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap();
        assert_eq!(verified.session_id, issued.session_id);
        assert_eq!(verified.verified_at, start());

        assert_eq!(
            h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap_err(),
            SentinelError::InvalidSession
        );
        assert_eq!(h.manager.live_sessions().unwrap(), 0);
        assert_eq!(
            h.audit.kinds(),
            vec![AuditKind::OtpIssued, AuditKind::OtpVerified, AuditKind::OtpRejected]
        );
    }

    #[test]
    fn phone_formatting_does_not_matter_at_verify() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();
        h.manager
            .verify_otp(&issued.session_id, &code, "+91 98765-43210")
            .unwrap();
    }

    #[test]
    fn wrong_code_keeps_session() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert_eq!(
            h.manager.verify_otp(&issued.session_id, wrong, PHONE).unwrap_err(),
            SentinelError::CodeMismatch
        );
        assert_eq!(h.manager.live_sessions().unwrap(), 1);
        h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap();
    }

    #[test]
    fn wrong_phone_keeps_session() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();

        assert_eq!(
            h.manager.verify_otp(&issued.session_id, &code, "9123456780").unwrap_err(),
            SentinelError::PhoneMismatch
        );
        // A malformed number is a mismatch, not a format error.
        assert_eq!(
            h.manager.verify_otp(&issued.session_id, &code, "555").unwrap_err(),
            SentinelError::PhoneMismatch
        );
        assert_eq!(h.manager.live_sessions().unwrap(), 1);
    }

    #[test]
    fn malformed_code_is_rejected_before_lookup() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        for bad in ["", "12345", "1234567", "12a456"] {
            let err = h.manager.verify_otp(&issued.session_id, bad, PHONE).unwrap_err();
            assert!(err.is_input_error(), "{bad:?}");
            assert!(matches!(err, SentinelError::InvalidInput { .. }));
        }
        // Only the issuance was recorded.
        assert_eq!(h.audit.kinds(), vec![AuditKind::OtpIssued]);
        assert_eq!(h.manager.live_sessions().unwrap(), 1);
    }

    #[test]
    fn unknown_session_is_invalid() {
        let h = dev();
        assert_eq!(
            h.manager.verify_otp("otp_missing", "123456", PHONE).unwrap_err(),
            SentinelError::InvalidSession
        );
    }

    // ── Expiry ───────────────────────────────────────────────────────────────

    #[test]
    fn expiry_boundary_is_inclusive() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();

        h.clock.advance(Duration::seconds(300));
        h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap();
    }

    #[test]
    fn expired_then_invalid_after_first_attempt() {
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();

        h.clock.advance(Duration::seconds(301));
        assert_eq!(
            h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap_err(),
            SentinelError::Expired
        );
        // The expired attempt removed the session.
        assert_eq!(
            h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap_err(),
            SentinelError::InvalidSession
        );
    }

    #[test]
    fn sweep_removes_expired_sessions() {
        let h = dev();
        let old = h.manager.issue(PHONE).unwrap();
        h.clock.advance(Duration::seconds(200));
        let fresh = h.manager.issue(PHONE).unwrap();

        h.clock.advance(Duration::seconds(150));
        assert_eq!(h.manager.sweep_expired().unwrap(), 1);
        assert_eq!(h.manager.sweep_expired().unwrap(), 0);

        assert_eq!(
            h.manager
                .verify_otp(&old.session_id, &old.otp.unwrap(), PHONE)
                .unwrap_err(),
            SentinelError::InvalidSession
        );
        h.manager
            .verify_otp(&fresh.session_id, &fresh.otp.unwrap(), PHONE)
            .unwrap();

        let kinds = h.audit.kinds();
        assert_eq!(kinds.iter().filter(|k| **k == AuditKind::OtpSwept).count(), 1);
    }

    #[test]
    fn custom_ttl_and_length() {
        let settings = OtpSettings {
            ttl_seconds: 60,
            code_length: 8,
            ..OtpSettings::development()
        };
        let h = harness(settings, DeliveryRoute::FallbackOnly);
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();
        assert_eq!(code.len(), 8);
        assert_eq!(issued.expires_at, start() + Duration::seconds(60));

        h.clock.advance(Duration::seconds(61));
        assert_eq!(
            h.manager.verify_otp(&issued.session_id, &code, PHONE).unwrap_err(),
            SentinelError::Expired
        );
    }

    // ── Concurrency ──────────────────────────────────────────────────────────

    #[test]
    fn concurrent_verifiers_exactly_one_wins() {
        const THREADS: usize = 16;
        let h = dev();
        let issued = h.manager.issue(PHONE).unwrap();
        let code = issued.otp.unwrap();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let manager = h.manager.clone();
                let barrier = barrier.clone();
                let session_id = issued.session_id.clone();
                let code = code.clone();
                thread::spawn(move || {
                    barrier.wait();
                    manager.verify_otp(&session_id, &code, PHONE)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert_eq!(result.as_ref().unwrap_err(), &SentinelError::InvalidSession);
        }
        assert!(h.store.is_empty().unwrap());
    }

    #[test]
    fn concurrent_issue_and_sweep() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;
        let h = dev();

        // Sessions from before the clock jump are already expired.
        for _ in 0..10 {
            h.manager.issue(PHONE).unwrap();
        }
        h.clock.advance(Duration::seconds(301));

        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let manager = h.manager.clone();
            handles.push(thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|_| manager.issue(PHONE).map(|i| i.session_id))
                    .collect::<SentinelResult<Vec<_>>>()
            }));
        }
        let sweeper = {
            let manager = h.manager.clone();
            thread::spawn(move || {
                let mut removed = 0;
                for _ in 0..20 {
                    removed += manager.sweep_expired().unwrap();
                }
                removed
            })
        };

        let issued: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap().unwrap())
            .collect();
        let removed = sweeper.join().unwrap() + h.manager.sweep_expired().unwrap();

        assert_eq!(removed, 10);
        assert_eq!(issued.len(), THREADS * PER_THREAD);
        assert_eq!(h.manager.live_sessions().unwrap(), THREADS * PER_THREAD);
        for id in &issued {
            assert!(h.store.get(id).unwrap().is_some());
        }
    }

    #[test]
    fn manager_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OtpManager>();
        assert_send_sync::<InMemorySessionStore>();
    }
}
