//! Scam detection, risk verdict, and downstream action types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of scanning text against the social-engineering phrase catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamCheckResult {
    pub detected: bool,
    /// Matched catalog entries, in catalog order.
    pub phrases: Vec<String>,
    pub count: usize,
    /// `min(count * per_phrase_weight, 100)`.
    pub risk_contribution: u32,
}

/// Coarse risk bucket, monotonic in the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The aggregated, explainable risk decision for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    /// Clamped to 0–100.
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    /// Human-readable factors in the order the rules fired.
    pub factors: Vec<String>,
    pub requires_additional_verification: bool,
}

/// What the request-handling layer must do with a verdict.
///
/// A pure function of `RiskLevel`; see [`RecommendedAction::for_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// CRITICAL: block the transfer and escalate to support.
    Block,
    /// HIGH: require a secondary OTP verification.
    RequireOtp,
    /// MEDIUM: require a verification code.
    RequireVerificationCode,
    /// LOW: execute the transfer.
    Proceed,
}

impl RecommendedAction {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => Self::Block,
            RiskLevel::High => Self::RequireOtp,
            RiskLevel::Medium => Self::RequireVerificationCode,
            RiskLevel::Low => Self::Proceed,
        }
    }

    /// Operator-facing recommendation lines for this action.
    pub fn recommendations(&self) -> Vec<String> {
        let lines: &[&str] = match self {
            Self::Block => &[
                "Block transaction - extreme risk detected",
                "Contact customer support immediately",
            ],
            Self::RequireOtp => &[
                "Request additional verification (OTP/2FA)",
                "Confirm transaction details with customer",
            ],
            Self::RequireVerificationCode => &["Request verification code"],
            Self::Proceed => &["Proceed with transaction"],
        };
        lines.iter().map(|l| l.to_string()).collect()
    }

    /// True when the transfer may run without a further check.
    pub fn permits_execution(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// A risk verdict together with the action it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub verdict: RiskVerdict,
    pub action: RecommendedAction,
    pub recommendations: Vec<String>,
}

impl RiskReport {
    pub fn from_verdict(verdict: RiskVerdict) -> Self {
        let action = RecommendedAction::for_level(verdict.risk_level);
        Self {
            recommendations: action.recommendations(),
            action,
            verdict,
        }
    }
}
