//! The Sentinel decision engine.
//!
//! The engine enforces the assessment pipeline:
//!
//!   Validate → Liveness → Stress → Risk → Action → Audit
//!
//! Input is rejected before any scoring if it is malformed. A decision is
//! only returned after its audit record has been written; if the write
//! fails the caller gets `AuditWriteFailed`, never a verdict. A fault can
//! therefore never be read as "safe to proceed".

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use sentinel_contracts::{
    assessment::{validate_amount, Assessment, AssessmentId, AuditKind, AuditRecord, TransactionRequest},
    error::{SentinelError, SentinelResult},
    liveness::{ChallengePhrase, LivenessCheck},
    risk::{RecommendedAction, RiskReport, ScamCheckResult},
    signal::{StressLevel, StressSignal},
};
use sentinel_policy::ScoringPolicy;
use sentinel_scoring::{liveness, risk, scam, stress};

use crate::traits::{AuditWriter, Clock};

/// Runs the scorers over one request and records the outcome.
///
/// The engine holds no per-request state and may be shared across threads
/// behind an `Arc`.
pub struct DecisionEngine {
    policy: ScoringPolicy,
    audit: Arc<dyn AuditWriter>,
    clock: Arc<dyn Clock>,
}

impl DecisionEngine {
    pub fn new(policy: ScoringPolicy, audit: Arc<dyn AuditWriter>, clock: Arc<dyn Clock>) -> Self {
        Self { policy, audit, clock }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Draw a challenge phrase for a new liveness attempt.
    pub fn issue_challenge(&self) -> SentinelResult<ChallengePhrase> {
        self.policy.lexicon.challenges.issue()
    }

    /// Liveness path: score the transcript against the challenge and report
    /// the stress level of the same transcript.
    pub fn verify_liveness(
        &self,
        transcript: &str,
        challenge: &ChallengePhrase,
    ) -> SentinelResult<LivenessCheck> {
        require_text("transcript", transcript)?;
        require_text("challenge_phrase", challenge.as_str())?;

        let liveness = liveness::verify(transcript, challenge, &self.policy);
        let stress_level = stress::estimate(transcript, &self.policy.stress).level;
        Ok(LivenessCheck {
            liveness,
            stress_level,
        })
    }

    /// Emotion path.
    pub fn estimate_stress(&self, text: &str) -> SentinelResult<StressSignal> {
        require_text("text", text)?;
        Ok(stress::estimate(text, &self.policy.stress))
    }

    /// Standalone scam check, weighted with `scam_check_weight`.
    pub fn scam_check(&self, text: &str) -> SentinelResult<ScamCheckResult> {
        require_text("text", text)?;
        let result = scam::detect(
            text,
            &self.policy.lexicon.scam_phrases,
            self.policy.scam.scam_check_weight,
        );

        self.record(
            AuditKind::ScamChecked,
            "*".to_string(),
            json!({
                "detected": result.detected,
                "phrases": result.phrases,
                "risk_contribution": result.risk_contribution,
            }),
        )?;
        Ok(result)
    }

    /// Aggregate signals the caller already holds.
    pub fn evaluate_risk(
        &self,
        amount: f64,
        transcript: &str,
        liveness_passed: bool,
        stress_level: StressLevel,
    ) -> SentinelResult<RiskReport> {
        require_text("transcript", transcript)?;
        validate_amount(amount)?;

        let verdict = risk::evaluate(amount, transcript, liveness_passed, stress_level, &self.policy);
        let report = RiskReport::from_verdict(verdict);

        self.record(
            AuditKind::RiskEvaluated,
            "*".to_string(),
            json!({
                "amount": amount,
                "liveness_passed": liveness_passed,
                "stress_level": stress_level,
                "risk_score": report.verdict.risk_score,
                "risk_level": report.verdict.risk_level,
                "factors": report.verdict.factors,
                "action": report.action,
            }),
        )?;
        Ok(report)
    }

    /// Full assessment of one transfer request.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank transcript or challenge or a bad amount
    /// (nothing is scored or recorded); `AuditWriteFailed` if the decision
    /// could not be recorded.
    pub fn assess(&self, request: &TransactionRequest) -> SentinelResult<Assessment> {
        request.validate()?;

        let assessment_id = AssessmentId::new();
        debug!(
            assessment_id = %assessment_id.0,
            amount = request.amount,
            "assessment starting"
        );

        // ── Liveness and stress ──────────────────────────────────────────────
        let liveness = liveness::verify(&request.transcript, &request.challenge, &self.policy);
        let stress = stress::estimate(&request.transcript, &self.policy.stress);

        // ── Risk ─────────────────────────────────────────────────────────────
        let verdict = risk::evaluate(
            request.amount,
            &request.transcript,
            liveness.passed,
            stress.level,
            &self.policy,
        );
        let RiskReport {
            verdict,
            action,
            recommendations,
        } = RiskReport::from_verdict(verdict);

        // ── Audit ────────────────────────────────────────────────────────────
        self.record(
            AuditKind::TransactionAssessed,
            assessment_id.0.to_string(),
            json!({
                "amount": request.amount,
                "recipient": request.recipient,
                "transcript_chars": request.transcript.chars().count(),
                "liveness_passed": liveness.passed,
                "liveness_score": liveness.score,
                "stress_level": stress.level,
                "risk_score": verdict.risk_score,
                "risk_level": verdict.risk_level,
                "factors": verdict.factors,
                "action": action,
            }),
        )?;

        if action == RecommendedAction::Block {
            warn!(
                assessment_id = %assessment_id.0,
                risk_score = verdict.risk_score,
                factors = ?verdict.factors,
                "transaction blocked"
            );
        } else {
            info!(
                assessment_id = %assessment_id.0,
                risk_score = verdict.risk_score,
                risk_level = %verdict.risk_level,
                action = ?action,
                "transaction assessed"
            );
        }

        Ok(Assessment {
            assessment_id,
            liveness,
            stress,
            verdict,
            action,
            recommendations,
            assessed_at: self.clock.now(),
        })
    }

    fn record(&self, kind: AuditKind, subject: String, detail: serde_json::Value) -> SentinelResult<()> {
        let record = AuditRecord {
            kind,
            subject,
            detail,
            timestamp: self.clock.now(),
        };
        self.audit.write(&record)
    }
}

fn require_text(field: &str, value: &str) -> SentinelResult<()> {
    if value.trim().is_empty() {
        return Err(SentinelError::InvalidInput {
            reason: format!("{field} required"),
        });
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────
