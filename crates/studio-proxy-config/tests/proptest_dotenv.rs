//! Env parser property-based tests.
//!
//! ## Purpose
//! These tests fuzz env file text to ensure the parser and lint pass never
//! panic and agree with each other on adversarial input.
// crates/studio-proxy-config/tests/proptest_dotenv.rs
// ============================================================================
// Module: Env Parser Property-Based Tests
// Description: Fuzz-like checks for env parsing and lint.
// Purpose: Ensure parsing fails closed without panics on arbitrary input.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use studio_proxy_config::KEY_SPECS;
use studio_proxy_config::LintCode;
use studio_proxy_config::ProxyConfig;
use studio_proxy_config::lint_env_str;
use studio_proxy_config::parse_env_str;

proptest! {
    #[test]
    fn parser_and_lint_never_panic(input in "\\PC{0,256}") {
        let _ = parse_env_str(&input);
        let _ = lint_env_str(&input);
    }

    #[test]
    fn line_noise_never_panics(input in "[A-Za-z0-9_=#'\" \\\\\t\n]{0,200}") {
        let strict = parse_env_str(&input);
        let report = lint_env_str(&input);
        let syntax_clean =
            !report.contains(LintCode::Syntax) && !report.contains(LintCode::DuplicateKey);
        prop_assert_eq!(strict.is_ok(), syntax_clean);
    }

    #[test]
    fn registered_values_never_panic(index in 0..KEY_SPECS.len(), value in "\\PC{0,40}") {
        let spec = &KEY_SPECS[index];
        let mut values = std::collections::BTreeMap::new();
        values.insert(spec.name.to_string(), value);
        if let Ok(config) = ProxyConfig::from_values(&values) {
            let _ = config.validate();
            let _ = config.warnings();
        }
    }
}
