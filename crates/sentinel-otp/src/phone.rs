//! Phone number normalization.
//!
//! Only digits are kept. Ten digits are a national number and get the
//! default country code; twelve digits already carry one. Everything else is
//! rejected at issuance.

use sentinel_contracts::error::{SentinelError, SentinelResult};

/// Normalize to `+<country><number>`.
pub fn normalize_phone(raw: &str, country_code: &str) -> SentinelResult<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Ok(format!("+{country_code}{digits}")),
        12 => Ok(format!("+{digits}")),
        other => Err(SentinelError::InvalidPhoneFormat { digits: other }),
    }
}

/// Normalize when possible, otherwise return the trimmed input unchanged.
///
/// Used at verification, where a malformed number must surface as a phone
/// mismatch rather than a format error.
pub fn normalize_phone_lenient(raw: &str, country_code: &str) -> String {
    normalize_phone(raw, country_code).unwrap_or_else(|_| raw.trim().to_string())
}

/// Keep only the last four digits for log fields.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("***{tail}")
}
