//! Scoring tables: catalogs, weights, and thresholds.
//!
//! Every table has a built-in default equal to the production values, and
//! every section is `#[serde(default)]`, so a TOML file only needs to name
//! what it overrides.
//!
//! Example in TOML:
//! ```toml
//! [scam]
//! aggregation_weight = 25
//! scam_check_weight = 30
//!
//! [[stress.keywords]]
//! keyword = "urgent"
//! weight = 3
//! ```

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use sentinel_contracts::{
    error::{SentinelError, SentinelResult},
    liveness::ChallengePhrase,
    risk::RiskLevel,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Lexicon ───────────────────────────────────────────────────────────────────

/// The fixed phrase sets the lexicon matcher scans against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconTables {
    /// Social-engineering phrases. Match order is catalog order.
    pub scam_phrases: Vec<String>,
    /// Hesitation tokens, matched as whole words.
    pub filler_words: Vec<String>,
    /// Phrases issued for liveness challenges.
    pub challenges: ChallengeCatalog,
}

impl Default for LexiconTables {
    fn default() -> Self {
        Self {
            scam_phrases: strings(&[
                "account is blocked",
                "share otp",
                "share your otp",
                "send your otp",
                "confirm otp",
                "kyc expired",
                "verification from bank",
                "urgent action required",
                "account suspended",
                "confirm your details",
                "update your password",
                "click this link",
                "verify identity",
                "click here immediately",
                "unusual activity detected",
            ]),
            filler_words: strings(&[
                "uh",
                "um",
                "ah",
                "uh-huh",
                "like",
                "you know",
                "basically",
                "literally",
            ]),
            challenges: ChallengeCatalog::default(),
        }
    }
}

/// The catalog challenge phrases are drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeCatalog {
    phrases: Vec<String>,
}

impl ChallengeCatalog {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    /// Pick one phrase uniformly at random.
    ///
    /// Returns `ConfigError` for an empty catalog.
    pub fn issue(&self) -> SentinelResult<ChallengePhrase> {
        self.phrases
            .choose(&mut rand::thread_rng())
            .map(|p| ChallengePhrase::new(p.as_str()))
            .ok_or_else(|| SentinelError::ConfigError {
                reason: "challenge catalog is empty".to_string(),
            })
    }

    /// Case-insensitive membership, ignoring surrounding whitespace.
    pub fn contains(&self, phrase: &ChallengePhrase) -> bool {
        let wanted = phrase.as_str().trim().to_lowercase();
        self.phrases.iter().any(|p| p.to_lowercase() == wanted)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for ChallengeCatalog {
    fn default() -> Self {
        Self::new(strings(&[
            "green mango",
            "blue river",
            "silver coin",
            "seven eight nine",
            "bright sun",
            "warm cup",
            "strong tree",
            "deep water",
        ]))
    }
}

// ── Liveness ──────────────────────────────────────────────────────────────────

/// Additive/subtractive points for the challenge-response verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessWeights {
    pub base: i32,
    /// Whole challenge phrase found in the transcript.
    pub exact_match: i32,
    /// At least one challenge word found.
    pub partial_match: i32,
    /// Subtracted when nothing matched.
    pub no_match_penalty: i32,
    /// Subtracted per distinct filler word.
    pub filler_penalty: i32,
    pub natural_speech_bonus: i32,
    pub natural_speech_min_words: usize,
    pub pass_mark: i32,
}

impl Default for LivenessWeights {
    fn default() -> Self {
        Self {
            base: 50,
            exact_match: 40,
            partial_match: 25,
            no_match_penalty: 20,
            filler_penalty: 5,
            natural_speech_bonus: 5,
            natural_speech_min_words: 3,
            pass_mark: 70,
        }
    }
}

// ── Stress ────────────────────────────────────────────────────────────────────

/// One row of the stress keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub keyword: String,
    pub weight: u32,
}

impl KeywordWeight {
    fn new(keyword: &str, weight: u32) -> Self {
        Self {
            keyword: keyword.to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressTable {
    pub keywords: Vec<KeywordWeight>,
    /// `raw_score >= high_at` → high.
    pub high_at: u32,
    /// `raw_score >= medium_at` → medium.
    pub medium_at: u32,
    /// Presence of this keyword sets the `fear` signal.
    pub fear_keyword: String,
    pub fear_value: f64,
}

impl Default for StressTable {
    fn default() -> Self {
        Self {
            keywords: vec![
                KeywordWeight::new("urgent", 3),
                KeywordWeight::new("immediately", 3),
                KeywordWeight::new("emergency", 3),
                KeywordWeight::new("quick", 2),
                KeywordWeight::new("hurry", 2),
                KeywordWeight::new("please", 1),
                KeywordWeight::new("help", 2),
                KeywordWeight::new("worried", 2),
                KeywordWeight::new("confused", 1),
            ],
            high_at: 4,
            medium_at: 2,
            fear_keyword: "help".to_string(),
            fear_value: 0.2,
        }
    }
}

// ── Scam ──────────────────────────────────────────────────────────────────────

/// Per-phrase weights for the two scam-detection consumers.
///
/// The two are configured independently and must not be collapsed into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScamWeights {
    /// Used when the detector feeds the risk aggregator.
    pub aggregation_weight: u32,
    /// Used by the standalone scam-check path.
    pub scam_check_weight: u32,
}

impl Default for ScamWeights {
    fn default() -> Self {
        Self {
            aggregation_weight: 25,
            scam_check_weight: 30,
        }
    }
}

// ── Risk ──────────────────────────────────────────────────────────────────────

/// An amount band: any amount strictly above `above` scores `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountTier {
    pub above: f64,
    pub points: u32,
    pub factor: String,
}

impl AmountTier {
    fn new(above: f64, points: u32, factor: &str) -> Self {
        Self {
            above,
            points,
            factor: factor.to_string(),
        }
    }
}

/// Lower bounds of each risk level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
}

impl LevelThresholds {
    /// Map a clamped score to its level. Monotonic in `score`.
    pub fn level_for(&self, score: u32) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            critical: 70,
            high: 50,
            medium: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTable {
    /// Checked in order; the first tier the amount exceeds wins. Must be
    /// sorted by `above`, descending.
    pub amount_tiers: Vec<AmountTier>,
    pub failed_liveness_points: u32,
    pub high_stress_points: u32,
    pub medium_stress_points: u32,
    pub levels: LevelThresholds,
    /// Scores at or above this require additional verification.
    pub additional_verification_at: u32,
}

impl Default for RiskTable {
    fn default() -> Self {
        Self {
            amount_tiers: vec![
                AmountTier::new(100_000.0, 30, "high-value transfer (>₹100k)"),
                AmountTier::new(50_000.0, 20, "medium-high value transfer (>₹50k)"),
                AmountTier::new(10_000.0, 10, "medium value transfer (>₹10k)"),
            ],
            failed_liveness_points: 20,
            high_stress_points: 10,
            medium_stress_points: 5,
            levels: LevelThresholds::default(),
            additional_verification_at: 50,
        }
    }
}
