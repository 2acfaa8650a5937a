// crates/studio-proxy-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared fixtures for studio-proxy-core integration tests.
// Purpose: Build configs and upload directories without repeating setup.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use studio_proxy_config::ProxyConfig;

pub mod env;

/// One day.
pub const DAY: Duration = Duration::from_secs(86_400);

/// Builds a validated config from pairs over defaults.
pub fn config_with(pairs: &[(&str, &str)]) -> Result<ProxyConfig, String> {
    let values: BTreeMap<String, String> =
        pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect();
    let config = ProxyConfig::from_values(&values).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

/// Writes `contents` to `dir/name` and backdates its mtime by `age`.
pub fn write_aged(
    dir: &Path,
    name: &str,
    contents: &[u8],
    age: Duration,
) -> Result<PathBuf, String> {
    let path = dir.join(name);
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    let modified = SystemTime::now().checked_sub(age).ok_or("age out of range")?;
    let file = File::options().write(true).open(&path).map_err(|err| err.to_string())?;
    file.set_modified(modified).map_err(|err| err.to_string())?;
    Ok(path)
}
