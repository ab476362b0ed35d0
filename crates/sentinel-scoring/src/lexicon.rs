//! Lexicon matching: case-insensitive substring and whole-word scans
//! against fixed phrase sets.
//!
//! No tokenization and no fuzzy matching. A phrase is present when it
//! appears verbatim in the normalized text. Normalization never mutates the
//! caller's string; it returns a new one.

/// Lower-case and trim.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Catalog entries found as substrings of `normalize(text)`, in catalog
/// order.
///
/// Blank catalog entries never match, so empty text always yields an empty
/// result.
pub fn match_phrases<'c>(text: &str, catalog: &'c [String]) -> Vec<&'c str> {
    let haystack = normalize(text);
    catalog
        .iter()
        .map(|phrase| phrase.as_str())
        .filter(|phrase| contains_phrase(&haystack, phrase))
        .collect()
}

/// True when the normalized `phrase` is non-empty and occurs in the
/// normalized `text`.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let needle = normalize(phrase);
    !needle.is_empty() && normalize(text).contains(&needle)
}

/// Number of distinct filler tokens that occur as whole words.
///
/// A filler counts when it appears surrounded by spaces in the normalized
/// text padded with one space on each side. Each filler counts at most once,
/// however often it is repeated. Punctuation glued to a word prevents the
/// match.
pub fn count_fillers(text: &str, fillers: &[String]) -> usize {
    let padded = format!(" {} ", normalize(text));
    fillers
        .iter()
        .map(|filler| normalize(filler))
        .filter(|filler| !filler.is_empty() && padded.contains(&format!(" {filler} ")))
        .count()
}

/// True when any whitespace-separated word of `phrase` is a substring of
/// `text`. Both sides are normalized first.
pub fn contains_any_word(text: &str, phrase: &str) -> bool {
    let haystack = normalize(text);
    normalize(phrase)
        .split_whitespace()
        .any(|word| haystack.contains(word))
}
