//! Stress and emotion signal derived from transcript text.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SentinelError;

/// Coarse stress bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StressLevel {
    type Err = SentinelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(SentinelError::InvalidInput {
                reason: format!("unknown stress level '{other}'"),
            }),
        }
    }
}

/// Stress estimate for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSignal {
    pub level: StressLevel,
    /// `min(raw_score / 10, 1.0)`.
    pub confidence: f64,
    /// Named signals in 0–1. Always contains `urgency` and `fear`.
    pub emotions: BTreeMap<String, f64>,
    /// Sum of the weights of every stress keyword present.
    pub raw_score: u32,
}
