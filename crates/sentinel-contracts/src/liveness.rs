//! Challenge-response liveness types.
//!
//! A `ChallengePhrase` is issued to the caller once per liveness attempt and
//! handed back together with the transcript of what the caller said. The
//! verifier compares the two and produces a `LivenessResult`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signal::StressLevel;

/// A short phrase the caller must repeat back to prove a live speaker.
///
/// Immutable once issued. The phrase carries no identity beyond the attempt
/// it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengePhrase(String);

impl ChallengePhrase {
    /// Wrap any phrase. No catalog membership check happens here: the caller
    /// supplies the phrase back and the verifier scores whatever it receives.
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(phrase.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the phrase is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ChallengePhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChallengePhrase {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Outcome of one challenge-response verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessResult {
    /// True when `score` reached the pass mark.
    pub passed: bool,
    /// Clamped to 0–100.
    pub score: u8,
    /// `score / 100`.
    pub confidence: f64,
    /// One entry per rule that fired, in rule order.
    pub reasons: Vec<String>,
    /// The transcript exactly as supplied, before normalization.
    pub transcript: String,
}

/// A liveness result paired with the stress level of the same transcript,
/// as returned by the engine's liveness path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessCheck {
    #[serde(flatten)]
    pub liveness: LivenessResult,
    pub stress_level: StressLevel,
}
