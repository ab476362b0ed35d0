//! Challenge-response liveness verification.
//!
//! Scoring runs a fixed sequence of rules over the normalized transcript,
//! each adjusting the score and appending a reason when it fires:
//!
//! 1. Start from the base score.
//! 2. Whole challenge present → bonus; else any challenge word present →
//!    smaller bonus; else penalty.
//! 3. Penalty per distinct filler word.
//! 4. Bonus for a transcript of at least `natural_speech_min_words` words.
//! 5. Clamp to 0–100; pass at `pass_mark`.
//!
//! The function is total over string inputs. An empty challenge is a
//! substring of every transcript and therefore scores as a full match.

use tracing::debug;

use sentinel_contracts::liveness::{ChallengePhrase, LivenessResult};
use sentinel_policy::{LivenessWeights, ScoringPolicy};

use crate::lexicon;

/// Score `transcript` against the issued `challenge`.
pub fn verify(transcript: &str, challenge: &ChallengePhrase, policy: &ScoringPolicy) -> LivenessResult {
    let weights: &LivenessWeights = &policy.liveness;
    let spoken = lexicon::normalize(transcript);
    let expected = lexicon::normalize(challenge.as_str());

    let mut score = weights.base;
    let mut reasons = Vec::new();

    // TODO: an empty challenge matches every transcript here; hold until
    // product confirms whether blank challenges should fail outright.
    if spoken.contains(&expected) {
        score = score.saturating_add(weights.exact_match);
        reasons.push("challenge phrase detected".to_string());
    } else if lexicon::contains_any_word(&spoken, &expected) {
        score = score.saturating_add(weights.partial_match);
        reasons.push("partial match with challenge phrase".to_string());
    } else {
        score = score.saturating_sub(weights.no_match_penalty);
        reasons.push("challenge phrase not detected".to_string());
    }

    let fillers = lexicon::count_fillers(&spoken, &policy.lexicon.filler_words);
    if fillers > 0 {
        let fillers_i32 = i32::try_from(fillers).unwrap_or(i32::MAX);
        score = score.saturating_sub(weights.filler_penalty.saturating_mul(fillers_i32));
        reasons.push(format!("filler words detected: {fillers}"));
    }

    let words = transcript.split_whitespace().count();
    if words >= weights.natural_speech_min_words {
        score = score.saturating_add(weights.natural_speech_bonus);
        reasons.push("natural speech pattern detected".to_string());
    }

    let score = score.clamp(0, 100);
    let passed = score >= weights.pass_mark;

    debug!(
        score,
        passed,
        fillers,
        words,
        challenge = %challenge,
        "liveness scored"
    );

    LivenessResult {
        passed,
        score: score as u8,
        confidence: f64::from(score) / 100.0,
        reasons,
        transcript: transcript.to_string(),
    }
}
