// crates/studio-proxy-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for env config validation tests.
// Purpose: Reduce duplication across integration tests for studio-proxy-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;

use studio_proxy_config::ConfigError;
use studio_proxy_config::ProxyConfig;

/// Builds a raw value map from key/value pairs.
pub fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}

/// Returns the config built from registry defaults.
pub fn minimal_config() -> Result<ProxyConfig, String> {
    ProxyConfig::defaults().map_err(|err| err.to_string())
}

/// Builds a config from pairs over defaults without validating it.
pub fn config_with(pairs: &[(&str, &str)]) -> Result<ProxyConfig, String> {
    ProxyConfig::from_values(&values(pairs)).map_err(|err| err.to_string())
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
