//! Process-level runtime settings: deployment mode, OTP session parameters,
//! and SMS gateway credentials.
//!
//! Everything here is read once at startup. The `from_lookup` constructors
//! take the variable lookup as a closure so tests never touch the real
//! process environment.

use serde::{Deserialize, Serialize};
use tracing::warn;

use sentinel_contracts::error::{SentinelError, SentinelResult};

/// Whether the process is serving real customers.
///
/// Decides whether a plaintext OTP may ever be echoed back to a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Production,
    Development,
}

impl DeploymentMode {
    /// Parse a mode flag, failing closed.
    ///
    /// Only an explicit development marker (`development`, `dev`, `test`,
    /// `local`; case-insensitive) selects `Development`. An absent, empty, or
    /// unrecognized value selects `Production`.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::Production;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" | "local" => Self::Development,
            "production" | "prod" => Self::Production,
            other => {
                warn!(value = %other, "unrecognized deployment mode; treating as production");
                Self::Production
            }
        }
    }

    /// True when plaintext codes may be returned to the caller.
    pub fn exposes_codes(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Parameters of the OTP session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSettings {
    pub ttl_seconds: i64,
    pub code_length: usize,
    /// Prefix applied to 10-digit national numbers.
    pub country_code: String,
    pub mode: DeploymentMode,
}

impl OtpSettings {
    /// Environment variables consulted for the mode flag, in order.
    pub const MODE_VARS: [&'static str; 2] = ["SENTINEL_ENV", "ENVIRONMENT"];

    /// Read the deployment mode from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings using `lookup` for variable access.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let raw = Self::MODE_VARS.iter().find_map(|&key| lookup(key));
        Self {
            mode: DeploymentMode::parse(raw.as_deref()),
            ..Self::default()
        }
    }

    /// Shortest and longest code the manager will issue.
    pub const CODE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=12;

    /// Reject settings that would issue trivially guessable or already
    /// expired codes.
    pub fn validate(&self) -> SentinelResult<()> {
        if !Self::CODE_LENGTH_RANGE.contains(&self.code_length) {
            return Err(SentinelError::ConfigError {
                reason: format!(
                    "OTP code_length {} is outside {}-{}",
                    self.code_length,
                    Self::CODE_LENGTH_RANGE.start(),
                    Self::CODE_LENGTH_RANGE.end()
                ),
            });
        }
        if self.ttl_seconds <= 0 {
            return Err(SentinelError::ConfigError {
                reason: format!("OTP ttl_seconds must be positive (got {})", self.ttl_seconds),
            });
        }
        Ok(())
    }

    /// Settings for local runs and tests: codes are exposed.
    pub fn development() -> Self {
        Self {
            mode: DeploymentMode::Development,
            ..Self::default()
        }
    }
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            code_length: 6,
            country_code: "91".to_string(),
            mode: DeploymentMode::Production,
        }
    }
}

/// Credentials for the carrier SMS gateway.
///
/// Present only when every field is configured; a partial set is treated
/// as absent so the local fallback is selected.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl GatewayCredentials {
    pub const ACCOUNT_SID_VAR: &'static str = "SENTINEL_SMS_ACCOUNT_SID";
    pub const AUTH_TOKEN_VAR: &'static str = "SENTINEL_SMS_AUTH_TOKEN";
    pub const FROM_NUMBER_VAR: &'static str = "SENTINEL_SMS_FROM_NUMBER";

    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            account_sid: get(Self::ACCOUNT_SID_VAR)?,
            auth_token: get(Self::AUTH_TOKEN_VAR)?,
            from_number: get(Self::FROM_NUMBER_VAR)?,
        })
    }
}

impl std::fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .finish()
    }
}
