//! Wiring for the demo: one engine and one OTP manager sharing an in-memory
//! hash-chained audit trail.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use sentinel_audit::InMemoryAuditWriter;
use sentinel_contracts::error::{SentinelError, SentinelResult};
use sentinel_core::{clock::SystemClock, traits::AuditWriter, DecisionEngine};
use sentinel_otp::{DeliveryRoute, InMemorySessionStore, OtpManager};
use sentinel_policy::{GatewayCredentials, OtpSettings, ScoringPolicy};

pub struct Runtime {
    pub engine: DecisionEngine,
    pub otp: OtpManager,
    pub audit: Arc<InMemoryAuditWriter>,
}

impl Runtime {
    pub fn build(policy_path: Option<&Path>, settings: OtpSettings) -> SentinelResult<Self> {
        let policy = match policy_path {
            Some(path) => ScoringPolicy::from_file(path)?,
            None => ScoringPolicy::default(),
        };
        let audit = Arc::new(InMemoryAuditWriter::new("sentinel-demo"));
        let clock = Arc::new(SystemClock);

        // No carrier client ships with the demo; configured credentials are
        // reported and the local fallback carries every code.
        let route = DeliveryRoute::select(GatewayCredentials::from_env(), |_| {
            Err(SentinelError::DeliveryFailed {
                reason: "no carrier client in this build".to_string(),
            })
        });

        let engine = DecisionEngine::new(policy, audit.clone(), clock.clone());
        let otp = OtpManager::new(Arc::new(InMemorySessionStore::new()), clock, settings, route)?
            .with_audit(audit.clone());

        Ok(Self { engine, otp, audit })
    }

    /// Seal the audit trail and confirm the chain is intact.
    pub fn finish(&self) -> SentinelResult<()> {
        self.audit.finalize()?;
        let log = self.audit.export_log()?;
        if !self.audit.verify_integrity() {
            return Err(SentinelError::Internal {
                reason: "audit chain failed verification".to_string(),
            });
        }
        info!(events = log.events.len(), "audit trail sealed");
        println!(
            "Audit trail: {} events, chain verified, terminal hash {}",
            log.events.len(),
            log.terminal_hash
        );
        Ok(())
    }
}

pub fn print_json<T: Serialize>(label: &str, value: &T) -> SentinelResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| SentinelError::Internal {
        reason: format!("failed to render {label}: {e}"),
    })?;
    println!("── {label}");
    println!("{text}");
    println!();
    Ok(())
}
