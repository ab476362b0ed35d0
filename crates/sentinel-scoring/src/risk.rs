//! Weighted risk aggregation.
//!
//! Evaluation algorithm, additive and in fixed order. Each rule that fires
//! appends one factor string:
//!
//! 1. Amount: the first tier (highest first) the amount exceeds.
//! 2. Scam phrases: the detector's contribution at the aggregation weight.
//! 3. Liveness: fixed points when verification failed.
//! 4. Stress: fixed points for high or medium stress.
//!
//! The total is clamped to 100 before the level is derived, so the level is
//! a monotonic function of the reported score.

use tracing::debug;

use sentinel_contracts::{risk::RiskVerdict, signal::StressLevel};
use sentinel_policy::ScoringPolicy;

use crate::scam;

/// Aggregate every signal into a single verdict.
pub fn evaluate(
    amount: f64,
    transcript: &str,
    liveness_passed: bool,
    stress_level: StressLevel,
    policy: &ScoringPolicy,
) -> RiskVerdict {
    let table = &policy.risk;
    let mut score: u32 = 0;
    let mut factors = Vec::new();

    // ── 1. Amount tier ───────────────────────────────────────────────────────
    if let Some(tier) = table.amount_tiers.iter().find(|t| amount > t.above) {
        score = score.saturating_add(tier.points);
        factors.push(tier.factor.clone());
    }

    // ── 2. Scam phrases ──────────────────────────────────────────────────────
    let scam_check = scam::detect(
        transcript,
        &policy.lexicon.scam_phrases,
        policy.scam.aggregation_weight,
    );
    score = score.saturating_add(scam_check.risk_contribution);
    if scam_check.detected {
        factors.push(format!(
            "scam phrases detected: {}",
            scam_check.phrases.join(", ")
        ));
    }

    // ── 3. Liveness ──────────────────────────────────────────────────────────
    if !liveness_passed {
        score = score.saturating_add(table.failed_liveness_points);
        factors.push("failed voice liveness verification".to_string());
    }

    // ── 4. Stress ────────────────────────────────────────────────────────────
    match stress_level {
        StressLevel::High => {
            score = score.saturating_add(table.high_stress_points);
            factors.push("high stress detected in voice".to_string());
        }
        StressLevel::Medium => {
            score = score.saturating_add(table.medium_stress_points);
            factors.push("moderate stress detected".to_string());
        }
        StressLevel::Low => {}
    }

    let risk_score = score.min(100);
    let risk_level = table.levels.level_for(risk_score);

    debug!(
        risk_score,
        risk_level = %risk_level,
        factor_count = factors.len(),
        "risk aggregated"
    );

    RiskVerdict {
        risk_score,
        risk_level,
        factors,
        requires_additional_verification: risk_score >= table.additional_verification_at,
    }
}
