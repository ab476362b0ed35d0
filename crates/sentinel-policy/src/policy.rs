//! The complete scoring policy and its TOML loader.
//!
//! `ScoringPolicy` bundles every table the scorers read. Build one with
//! `ScoringPolicy::default()` for the built-in tables, or load overrides with
//! `from_toml_str` / `from_file`. Loaded policies are validated before they
//! are returned, so scorers can assume well-ordered thresholds and weights
//! small enough that no score computation can overflow.
//!
//! ```rust,ignore
//! use sentinel_policy::ScoringPolicy;
//!
//! let policy = ScoringPolicy::from_file(Path::new("policies/scoring.toml"))?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sentinel_contracts::error::{SentinelError, SentinelResult};

use crate::tables::{LexiconTables, LivenessWeights, RiskTable, ScamWeights, StressTable};

/// Upper bound for any single weight or threshold on the 0-100 scale.
const MAX_POINTS: i32 = 100;

/// Every catalog, weight, and threshold the scoring components use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub lexicon: LexiconTables,
    pub liveness: LivenessWeights,
    pub stress: StressTable,
    pub scam: ScamWeights,
    pub risk: RiskTable,
}

impl ScoringPolicy {
    /// Parse `s` as TOML, fill unspecified sections with defaults, and
    /// validate.
    ///
    /// Returns `SentinelError::ConfigError` if the TOML is malformed or the
    /// resulting tables are inconsistent.
    pub fn from_toml_str(s: &str) -> SentinelResult<Self> {
        let policy: ScoringPolicy = toml::from_str(s).map_err(|e| SentinelError::ConfigError {
            reason: format!("failed to parse scoring policy TOML: {}", e),
        })?;
        policy.validate()?;
        debug!(
            scam_phrases = policy.lexicon.scam_phrases.len(),
            stress_keywords = policy.stress.keywords.len(),
            amount_tiers = policy.risk.amount_tiers.len(),
            "scoring policy loaded"
        );
        Ok(policy)
    }

    /// Read the file at `path` and parse it as a TOML scoring policy.
    pub fn from_file(path: &Path) -> SentinelResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SentinelError::ConfigError {
            reason: format!("failed to read scoring policy '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check the invariants the scorers rely on.
    pub fn validate(&self) -> SentinelResult<()> {
        let levels = &self.risk.levels;
        if !(levels.critical > levels.high && levels.high > levels.medium) {
            return Err(config_error(format!(
                "risk level thresholds must be strictly descending (critical {} > high {} > medium {})",
                levels.critical, levels.high, levels.medium
            )));
        }
        if levels.critical > 100 {
            return Err(config_error(format!(
                "critical threshold {} is unreachable on a 0-100 scale",
                levels.critical
            )));
        }

        for pair in self.risk.amount_tiers.windows(2) {
            if !(pair[0].above > pair[1].above) {
                return Err(config_error(format!(
                    "amount tiers must be sorted descending ({} then {})",
                    pair[0].above, pair[1].above
                )));
            }
        }
        if let Some(tier) = self.risk.amount_tiers.iter().find(|t| !t.above.is_finite()) {
            return Err(config_error(format!(
                "amount tier '{}' has a non-finite bound",
                tier.factor
            )));
        }

        if self.stress.high_at < self.stress.medium_at {
            return Err(config_error(format!(
                "stress high_at ({}) must not be below medium_at ({})",
                self.stress.high_at, self.stress.medium_at
            )));
        }
        if !(0.0..=1.0).contains(&self.stress.fear_value) {
            return Err(config_error(format!(
                "stress fear_value {} must lie in 0-1",
                self.stress.fear_value
            )));
        }

        for (name, weight) in [
            ("aggregation_weight", self.scam.aggregation_weight),
            ("scam_check_weight", self.scam.scam_check_weight),
        ] {
            if weight > 100 {
                return Err(config_error(format!("scam {name} {weight} exceeds 100")));
            }
        }

        let live = &self.liveness;
        for (name, weight) in [
            ("base", live.base),
            ("exact_match", live.exact_match),
            ("partial_match", live.partial_match),
            ("no_match_penalty", live.no_match_penalty),
            ("filler_penalty", live.filler_penalty),
            ("natural_speech_bonus", live.natural_speech_bonus),
        ] {
            if !(-MAX_POINTS..=MAX_POINTS).contains(&weight) {
                return Err(config_error(format!(
                    "liveness {name} {weight} is outside -{MAX_POINTS}..={MAX_POINTS}"
                )));
            }
        }
        if !(0..=MAX_POINTS).contains(&live.pass_mark) {
            return Err(config_error(format!(
                "liveness pass_mark {} is outside 0-{MAX_POINTS}",
                live.pass_mark
            )));
        }

        if let Some(row) = self.stress.keywords.iter().find(|k| k.weight > MAX_POINTS as u32) {
            return Err(config_error(format!(
                "stress keyword '{}' weight {} exceeds {MAX_POINTS}",
                row.keyword, row.weight
            )));
        }

        for (name, value) in [
            ("failed_liveness_points", self.risk.failed_liveness_points),
            ("high_stress_points", self.risk.high_stress_points),
            ("medium_stress_points", self.risk.medium_stress_points),
            ("additional_verification_at", self.risk.additional_verification_at),
        ] {
            if value > MAX_POINTS as u32 {
                return Err(config_error(format!("risk {name} {value} exceeds {MAX_POINTS}")));
            }
        }
        if let Some(tier) = self.risk.amount_tiers.iter().find(|t| t.points > MAX_POINTS as u32) {
            return Err(config_error(format!(
                "amount tier '{}' points {} exceed {MAX_POINTS}",
                tier.factor, tier.points
            )));
        }

        if self.lexicon.challenges.phrases().is_empty() {
            return Err(config_error("challenge catalog is empty"));
        }

        Ok(())
    }
}

fn config_error(reason: impl Into<String>) -> SentinelError {
    SentinelError::ConfigError {
        reason: reason.into(),
    }
}
