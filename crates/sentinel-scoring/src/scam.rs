//! Social-engineering phrase detection.
//!
//! The per-phrase weight is a parameter, not a constant: the risk
//! aggregator and the standalone scam check each pass their own configured
//! weight.

use tracing::debug;

use sentinel_contracts::risk::ScamCheckResult;

use crate::lexicon;

/// Scan `text` against `catalog`, weighting each match by
/// `per_phrase_weight`. The contribution saturates at 100.
pub fn detect(text: &str, catalog: &[String], per_phrase_weight: u32) -> ScamCheckResult {
    let phrases: Vec<String> = lexicon::match_phrases(text, catalog)
        .into_iter()
        .map(str::to_string)
        .collect();
    let count = phrases.len();
    let risk_contribution = (count as u32).saturating_mul(per_phrase_weight).min(100);

    if count > 0 {
        debug!(count, risk_contribution, phrases = ?phrases, "scam phrases matched");
    }

    ScamCheckResult {
        detected: count > 0,
        phrases,
        count,
        risk_contribution,
    }
}
