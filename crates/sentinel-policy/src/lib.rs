//! # sentinel-policy
//!
//! Scoring tables and runtime settings for the Sentinel engine.
//!
//! ## Overview
//!
//! [`ScoringPolicy`] holds every catalog, weight, and threshold the scorers
//! read: scam phrases, filler words, the challenge catalog, liveness points,
//! the stress keyword table, the two scam weights, amount tiers, and risk
//! level thresholds. Tables are plain data so they can be tested and swapped
//! without touching scoring logic.
//!
//! [`OtpSettings`] and [`GatewayCredentials`] are read from the process
//! environment once at startup. The deployment mode fails closed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use sentinel_policy::{OtpSettings, ScoringPolicy};
//!
//! let policy = ScoringPolicy::from_toml_str(include_str!("../../../policies/scoring.toml"))?;
//! let settings = OtpSettings::from_env();
//! ```

pub mod policy;
pub mod settings;
pub mod tables;

pub use policy::ScoringPolicy;
pub use settings::{DeploymentMode, GatewayCredentials, OtpSettings};
pub use tables::{
    AmountTier, ChallengeCatalog, KeywordWeight, LevelThresholds, LexiconTables,
    LivenessWeights, RiskTable, ScamWeights, StressTable,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sentinel_contracts::{error::SentinelError, liveness::ChallengePhrase, risk::RiskLevel};

    use crate::{
        ChallengeCatalog, DeploymentMode, GatewayCredentials, LevelThresholds, OtpSettings,
        ScoringPolicy,
    };

    const BUNDLED_POLICY: &str = include_str!("../../../policies/scoring.toml");

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── 1. bundled policy mirrors defaults ───────────────────────────────────

    #[test]
    fn test_bundled_policy_matches_defaults() {
        let loaded = ScoringPolicy::from_toml_str(BUNDLED_POLICY).unwrap();
        assert_eq!(loaded, ScoringPolicy::default());
    }

    // ── 2. partial overrides ─────────────────────────────────────────────────

    /// A TOML naming one key changes only that key.
    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let policy = ScoringPolicy::from_toml_str(
            r#"
            [scam]
            scam_check_weight = 40
        "#,
        )
        .unwrap();

        assert_eq!(policy.scam.scam_check_weight, 40);
        assert_eq!(policy.scam.aggregation_weight, 25);
        assert_eq!(policy.risk, ScoringPolicy::default().risk);
    }

    #[test]
    fn test_empty_toml_is_default_policy() {
        assert_eq!(
            ScoringPolicy::from_toml_str("").unwrap(),
            ScoringPolicy::default()
        );
    }

    // ── 3. the two scam weights are independent ──────────────────────────────

    #[test]
    fn test_scam_weights_default_to_distinct_values() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.scam.aggregation_weight, 25);
        assert_eq!(policy.scam.scam_check_weight, 30);
    }

    // ── 4. validation ────────────────────────────────────────────────────────

    #[test]
    fn test_non_descending_levels_rejected() {
        let result = ScoringPolicy::from_toml_str(
            r#"
            [risk.levels]
            critical = 50
            high = 50
            medium = 30
        "#,
        );
        match result {
            Err(SentinelError::ConfigError { reason }) => {
                assert!(reason.contains("strictly descending"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_unsorted_amount_tiers_rejected() {
        let result = ScoringPolicy::from_toml_str(
            r#"
            [[risk.amount_tiers]]
            above = 10000.0
            points = 10
            factor = "small"

            [[risk.amount_tiers]]
            above = 50000.0
            points = 20
            factor = "large"
        "#,
        );
        assert!(matches!(result, Err(SentinelError::ConfigError { .. })));
    }

    #[test]
    fn test_oversized_scam_weight_rejected() {
        let result = ScoringPolicy::from_toml_str("[scam]\naggregation_weight = 101\n");
        match result {
            Err(SentinelError::ConfigError { reason }) => {
                assert!(reason.contains("aggregation_weight"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    fn config_reason(toml: &str) -> String {
        match ScoringPolicy::from_toml_str(toml) {
            Err(SentinelError::ConfigError { reason }) => reason,
            other => panic!("expected ConfigError for {toml:?}, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_liveness_weights_rejected() {
        assert!(config_reason("[liveness]\nbase = 2147483647\n").contains("base"));
        assert!(config_reason("[liveness]\nfiller_penalty = -101\n").contains("filler_penalty"));
        assert!(config_reason("[liveness]\nexact_match = 101\n").contains("exact_match"));
    }

    #[test]
    fn test_unreachable_pass_mark_rejected() {
        assert!(config_reason("[liveness]\npass_mark = 101\n").contains("pass_mark"));
        assert!(config_reason("[liveness]\npass_mark = -1\n").contains("pass_mark"));
        assert!(ScoringPolicy::from_toml_str("[liveness]\npass_mark = 100\n").is_ok());
    }

    #[test]
    fn test_oversized_stress_keyword_weight_rejected() {
        let reason = config_reason(
            r#"
            [[stress.keywords]]
            keyword = "a"
            weight = 4294967295

            [[stress.keywords]]
            keyword = "b"
            weight = 1
        "#,
        );
        assert!(reason.contains("stress keyword 'a'"), "got: {reason}");
    }

    #[test]
    fn test_oversized_risk_points_rejected() {
        assert!(config_reason("[risk]\nadditional_verification_at = 101\n")
            .contains("additional_verification_at"));
        assert!(config_reason("[risk]\nfailed_liveness_points = 500\n")
            .contains("failed_liveness_points"));
        let reason = config_reason(
            r#"
            [[risk.amount_tiers]]
            above = 1000.0
            points = 4294967295
            factor = "huge"
        "#,
        );
        assert!(reason.contains("huge"), "got: {reason}");
    }

    #[test]
    fn test_empty_challenge_catalog_rejected() {
        let result = ScoringPolicy::from_toml_str("[lexicon]\nchallenges = []\n");
        assert!(matches!(result, Err(SentinelError::ConfigError { .. })));
    }

    #[test]
    fn test_toml_parse_error() {
        match ScoringPolicy::from_toml_str("this is not valid toml ][[[") {
            Err(SentinelError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse scoring policy TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    // ── 5. level thresholds ──────────────────────────────────────────────────

    #[test]
    fn test_level_thresholds_are_monotonic() {
        let levels = LevelThresholds::default();
        assert_eq!(levels.level_for(0), RiskLevel::Low);
        assert_eq!(levels.level_for(29), RiskLevel::Low);
        assert_eq!(levels.level_for(30), RiskLevel::Medium);
        assert_eq!(levels.level_for(49), RiskLevel::Medium);
        assert_eq!(levels.level_for(50), RiskLevel::High);
        assert_eq!(levels.level_for(69), RiskLevel::High);
        assert_eq!(levels.level_for(70), RiskLevel::Critical);
        assert_eq!(levels.level_for(100), RiskLevel::Critical);

        let mut previous = RiskLevel::Low;
        for score in 0..=100 {
            let level = levels.level_for(score);
            assert!(level >= previous, "level dropped at score {score}");
            previous = level;
        }
    }

    // ── 6. challenge catalog ─────────────────────────────────────────────────

    #[test]
    fn test_challenge_issue_draws_from_catalog() {
        let catalog = ChallengeCatalog::default();
        for _ in 0..50 {
            let phrase = catalog.issue().unwrap();
            assert!(catalog.contains(&phrase), "issued '{phrase}' not in catalog");
        }
        assert!(catalog.contains(&ChallengePhrase::new("  Green Mango ")));
        assert!(!catalog.contains(&ChallengePhrase::new("red apple")));
    }

    #[test]
    fn test_empty_catalog_cannot_issue() {
        let catalog = ChallengeCatalog::new(vec![]);
        assert!(matches!(
            catalog.issue(),
            Err(SentinelError::ConfigError { .. })
        ));
    }

    // ── 7. deployment mode fails closed ──────────────────────────────────────

    #[test]
    fn test_deployment_mode_fails_closed() {
        assert_eq!(DeploymentMode::parse(None), DeploymentMode::Production);
        assert_eq!(DeploymentMode::parse(Some("")), DeploymentMode::Production);
        assert_eq!(DeploymentMode::parse(Some("staging")), DeploymentMode::Production);
        assert_eq!(DeploymentMode::parse(Some("production")), DeploymentMode::Production);
        assert_eq!(DeploymentMode::parse(Some(" Development ")), DeploymentMode::Development);
        assert_eq!(DeploymentMode::parse(Some("test")), DeploymentMode::Development);
        assert!(!DeploymentMode::Production.exposes_codes());
        assert!(DeploymentMode::Development.exposes_codes());
    }

    #[test]
    fn test_otp_settings_read_mode_from_lookup() {
        let settings = OtpSettings::from_lookup(lookup(&[("ENVIRONMENT", "development")]));
        assert_eq!(settings.mode, DeploymentMode::Development);
        assert_eq!(settings.ttl_seconds, 300);
        assert_eq!(settings.code_length, 6);

        // SENTINEL_ENV takes precedence.
        let settings = OtpSettings::from_lookup(lookup(&[
            ("SENTINEL_ENV", "production"),
            ("ENVIRONMENT", "development"),
        ]));
        assert_eq!(settings.mode, DeploymentMode::Production);

        assert_eq!(OtpSettings::from_lookup(lookup(&[])).mode, DeploymentMode::Production);
    }

    // ── 8. gateway credentials ───────────────────────────────────────────────

    #[test]
    fn test_otp_settings_validation() {
        assert!(OtpSettings::default().validate().is_ok());
        assert!(OtpSettings::development().validate().is_ok());

        for code_length in [0, 3, 13] {
            let settings = OtpSettings {
                code_length,
                ..OtpSettings::default()
            };
            match settings.validate() {
                Err(SentinelError::ConfigError { reason }) => {
                    assert!(reason.contains("code_length"), "got: {reason}");
                }
                other => panic!("expected ConfigError for {code_length}, got {:?}", other),
            }
        }

        for ttl_seconds in [0, -300] {
            let settings = OtpSettings {
                ttl_seconds,
                ..OtpSettings::default()
            };
            assert!(matches!(settings.validate(), Err(SentinelError::ConfigError { .. })));
        }
    }

    #[test]
    fn test_gateway_credentials_require_every_field() {
        let full = [
            (GatewayCredentials::ACCOUNT_SID_VAR, "AC123"),
            (GatewayCredentials::AUTH_TOKEN_VAR, "secret"),
            (GatewayCredentials::FROM_NUMBER_VAR, "+15550000000"),
        ];
        let creds = GatewayCredentials::from_lookup(lookup(&full)).unwrap();
        assert_eq!(creds.account_sid, "AC123");
        assert!(!format!("{creds:?}").contains("secret"));

        let partial = [
            (GatewayCredentials::ACCOUNT_SID_VAR, "AC123"),
            (GatewayCredentials::AUTH_TOKEN_VAR, "   "),
            (GatewayCredentials::FROM_NUMBER_VAR, "+15550000000"),
        ];
        assert!(GatewayCredentials::from_lookup(lookup(&partial)).is_none());
    }
}
