// crates/studio-proxy-cli/tests/common/mod.rs
// =============================================================================
// Module: CLI Test Helpers
// Description: Runs the studio-proxy binary in an isolated directory.
// Purpose: Keep CLI tests independent of the caller's environment.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

/// Captured result of one CLI invocation.
pub struct CliRun {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl From<Output> for CliRun {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Path of the built binary.
pub fn studio_proxy_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_studio-proxy"))
}

/// Runs the binary in `dir` with an empty environment.
pub fn run_in(dir: &Path, args: &[&str]) -> Result<CliRun, String> {
    Command::new(studio_proxy_bin())
        .args(args)
        .current_dir(dir)
        .env_clear()
        .output()
        .map(CliRun::from)
        .map_err(|err| format!("failed to run studio-proxy: {err}"))
}

/// Runs the binary in `dir` with only the given environment variables set.
pub fn run_with_env(dir: &Path, args: &[&str], vars: &[(&str, &str)]) -> Result<CliRun, String> {
    Command::new(studio_proxy_bin())
        .args(args)
        .current_dir(dir)
        .env_clear()
        .envs(vars.iter().copied())
        .output()
        .map(CliRun::from)
        .map_err(|err| format!("failed to run studio-proxy: {err}"))
}

/// Writes `.env` contents into `dir` and returns its path as a string.
pub fn write_env(dir: &Path, contents: &str) -> Result<String, String> {
    let path = dir.join(".env");
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok(path.display().to_string())
}

/// Parses stdout as JSON.
pub fn stdout_json(run: &CliRun) -> Result<serde_json::Value, String> {
    serde_json::from_str(run.stdout.trim()).map_err(|err| format!("stdout is not json: {err}"))
}
