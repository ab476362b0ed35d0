//! Transaction assessment requests, results, and audit records.
//!
//! `TransactionRequest` is what the request-handling layer hands the engine.
//! `Assessment` is what it gets back. `AuditRecord` is what gets written to
//! the audit trail: one per decision or OTP state change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{SentinelError, SentinelResult},
    liveness::{ChallengePhrase, LivenessResult},
    risk::{RecommendedAction, RiskVerdict},
    signal::StressSignal,
};

/// Unique identifier for one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub uuid::Uuid);

impl AssessmentId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AssessmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// An inbound transfer to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Text from the speech-to-text collaborator. Untrusted.
    pub transcript: String,
    /// The phrase issued for this attempt.
    pub challenge: ChallengePhrase,
    /// Transfer amount in rupees.
    pub amount: f64,
    /// Recipient account, carried through to the audit trail only.
    #[serde(default)]
    pub recipient: Option<String>,
}

impl TransactionRequest {
    /// Reject requests that must never be scored.
    ///
    /// A blank transcript or challenge, or a negative / non-finite amount, is
    /// `InvalidInput`.
    pub fn validate(&self) -> SentinelResult<()> {
        if self.transcript.trim().is_empty() {
            return Err(SentinelError::invalid_input("transcript required"));
        }
        if self.challenge.is_blank() {
            return Err(SentinelError::invalid_input("challenge_phrase required"));
        }
        validate_amount(self.amount)
    }
}

/// Amounts must be finite and non-negative.
pub fn validate_amount(amount: f64) -> SentinelResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SentinelError::invalid_input(format!(
            "amount must be a finite, non-negative number (got {amount})"
        )));
    }
    Ok(())
}

/// The full decision for one `TransactionRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: AssessmentId,
    pub liveness: LivenessResult,
    pub stress: StressSignal,
    pub verdict: RiskVerdict,
    pub action: RecommendedAction,
    pub recommendations: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

/// The kinds of events the engine records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    TransactionAssessed,
    RiskEvaluated,
    ScamChecked,
    OtpIssued,
    OtpVerified,
    OtpRejected,
    OtpSwept,
}

/// An immutable record of one decision or OTP state change.
///
/// `detail` never contains an OTP code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub kind: AuditKind,
    /// What the record is about: an assessment id, a session id, or `"*"`
    /// for table-wide events.
    pub subject: String,
    pub detail: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
