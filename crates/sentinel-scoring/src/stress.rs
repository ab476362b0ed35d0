//! Keyword-weighted stress estimation.

use std::collections::BTreeMap;

use tracing::debug;

use sentinel_contracts::signal::{StressLevel, StressSignal};
use sentinel_policy::StressTable;

use crate::lexicon;

/// Estimate stress from `text`.
///
/// Each keyword in the table contributes its weight once if it appears
/// anywhere in the normalized text; repeats do not add up.
pub fn estimate(text: &str, table: &StressTable) -> StressSignal {
    let normalized = lexicon::normalize(text);

    let raw_score: u32 = table
        .keywords
        .iter()
        .filter(|k| lexicon::contains_phrase(&normalized, &k.keyword))
        .fold(0u32, |acc, k| acc.saturating_add(k.weight));

    let level = if raw_score >= table.high_at {
        StressLevel::High
    } else if raw_score >= table.medium_at {
        StressLevel::Medium
    } else {
        StressLevel::Low
    };

    let confidence = (f64::from(raw_score) / 10.0).min(1.0);
    let fear = if lexicon::contains_phrase(&normalized, &table.fear_keyword) {
        table.fear_value
    } else {
        0.0
    };

    let mut emotions = BTreeMap::new();
    emotions.insert("urgency".to_string(), confidence);
    emotions.insert("fear".to_string(), fear);

    debug!(raw_score, level = %level, "stress estimated");

    StressSignal {
        level,
        confidence,
        emotions,
        raw_score,
    }
}
