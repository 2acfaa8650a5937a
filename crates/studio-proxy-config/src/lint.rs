// crates/studio-proxy-config/src/lint.rs
// ============================================================================
// Module: Env Lint
// Description: Line-level and cross-field checks for env files.
// Purpose: Report every problem in an env file in a single pass.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Lint scans an env file leniently and reports syntax issues, duplicate and
//! unknown keys, values that fail their kind, and non-canonical spellings.
//! When no errors were found so far, the file is also loaded into
//! [`ProxyConfig`](crate::config::ProxyConfig) so cross-field validation
//! failures and soft warnings are reported too.
//!
//! Findings carrying a line number come first, in line order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::dotenv::DotenvError;
use crate::dotenv::ScanIssue;
use crate::dotenv::read_env_text;
use crate::dotenv::scan_env_str;
use crate::keys::find_key;
use crate::keys::is_canonical;
use crate::keys::parse_value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks loading.
    Error,
    /// Informational; the file still loads.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Stable finding codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintCode {
    /// Line is not `KEY=value`.
    Syntax,
    /// Key assigned more than once.
    DuplicateKey,
    /// Key is not registered.
    UnknownKey,
    /// Key matches a registered key only case-insensitively.
    NonUppercaseKey,
    /// Value fails its kind.
    InvalidValue,
    /// Value parses but is not canonically spelled.
    NonCanonicalValue,
    /// Cross-field validation failed.
    InvalidConfig,
    /// Soft configuration warning.
    ConfigWarning,
}

impl LintCode {
    /// Returns the stable code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::DuplicateKey => "duplicate_key",
            Self::UnknownKey => "unknown_key",
            Self::NonUppercaseKey => "non_uppercase_key",
            Self::InvalidValue => "invalid_value",
            Self::NonCanonicalValue => "non_canonical_value",
            Self::InvalidConfig => "invalid_config",
            Self::ConfigWarning => "config_warning",
        }
    }

    /// Returns the severity attached to the code.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnknownKey | Self::NonCanonicalValue | Self::ConfigWarning => Severity::Warning,
            Self::Syntax
            | Self::DuplicateKey
            | Self::NonUppercaseKey
            | Self::InvalidValue
            | Self::InvalidConfig => Severity::Error,
        }
    }
}

impl fmt::Display for LintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    /// 1-based line number, when the finding is tied to a line.
    pub line: Option<usize>,
    /// Key the finding concerns, if any.
    pub key: Option<String>,
    /// Finding severity.
    pub severity: Severity,
    /// Stable finding code.
    pub code: LintCode,
    /// Operator-facing message.
    pub message: String,
}

impl LintFinding {
    /// Builds a finding whose severity follows its code.
    fn new(line: Option<usize>, key: Option<&str>, code: LintCode, message: String) -> Self {
        Self {
            line,
            key: key.map(ToString::to_string),
            severity: code.severity(),
            code,
            message,
        }
    }
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: ")?,
            None => f.write_str("config: ")?,
        }
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)
    }
}

/// Lint findings for one env file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Findings sorted by line, line-less findings last.
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    /// Returns true when any finding is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|finding| finding.severity == Severity::Error)
    }

    /// Returns true when there are no findings at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns the number of error findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Returns the number of warning findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Returns true when a finding with `code` exists.
    #[must_use]
    pub fn contains(&self, code: LintCode) -> bool {
        self.findings.iter().any(|finding| finding.code == code)
    }

    /// Counts findings of one severity.
    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|finding| finding.severity == severity).count()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised before linting can start.
#[derive(Debug, Error)]
pub enum LintError {
    /// Env file could not be read.
    #[error("lint read error: {0}")]
    Read(#[from] DotenvError),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Lints the env file at `path`.
///
/// # Errors
///
/// Returns [`LintError`] when the file cannot be read as UTF-8 text.
pub fn lint_env_file(path: &Path) -> Result<LintReport, LintError> {
    let text = read_env_text(path)?;
    Ok(lint_env_str(&text))
}

/// Lints env file text.
#[must_use]
pub fn lint_env_str(input: &str) -> LintReport {
    let scan = scan_env_str(input);
    let mut findings = Vec::new();

    for issue in &scan.issues {
        match issue {
            ScanIssue::Syntax {
                line,
                message,
            } => findings.push(LintFinding::new(
                Some(*line),
                None,
                LintCode::Syntax,
                message.clone(),
            )),
            ScanIssue::Duplicate {
                key,
                line,
                first_line,
            } => findings.push(LintFinding::new(
                Some(*line),
                Some(key),
                LintCode::DuplicateKey,
                format!("{key} is already assigned on line {first_line}"),
            )),
        }
    }

    let mut values = BTreeMap::new();
    for entry in &scan.entries {
        let Some(spec) = find_key(&entry.key) else {
            let upper = entry.key.to_ascii_uppercase();
            if find_key(&upper).is_some() {
                findings.push(LintFinding::new(
                    Some(entry.line),
                    Some(&entry.key),
                    LintCode::NonUppercaseKey,
                    format!("{} must be written as {upper}", entry.key),
                ));
            } else {
                findings.push(LintFinding::new(
                    Some(entry.line),
                    Some(&entry.key),
                    LintCode::UnknownKey,
                    format!("{} is not a recognized key", entry.key),
                ));
            }
            continue;
        };
        match parse_value(spec.kind, &entry.value) {
            Ok(_) => {
                if !is_canonical(spec.kind, entry.value.trim()) {
                    findings.push(LintFinding::new(
                        Some(entry.line),
                        Some(spec.name),
                        LintCode::NonCanonicalValue,
                        format!(
                            "{} value `{}` is accepted but not canonical ({})",
                            spec.name,
                            entry.value,
                            spec.kind.label()
                        ),
                    ));
                }
                values.entry(entry.key.clone()).or_insert_with(|| entry.value.clone());
            }
            Err(reason) => findings.push(LintFinding::new(
                Some(entry.line),
                Some(spec.name),
                LintCode::InvalidValue,
                format!("{}: {reason}", spec.name),
            )),
        }
    }

    if !findings.iter().any(|finding| finding.severity == Severity::Error) {
        findings.extend(cross_field_findings(&values));
    }

    findings.sort_by_key(|finding| (finding.line.is_none(), finding.line));
    LintReport {
        findings,
    }
}

/// Loads the values and reports validation failures and warnings.
fn cross_field_findings(values: &BTreeMap<String, String>) -> Vec<LintFinding> {
    let config = match ProxyConfig::from_values(values) {
        Ok(config) => config,
        Err(err) => {
            return vec![LintFinding::new(None, None, LintCode::InvalidConfig, err.to_string())];
        }
    };
    let mut findings = Vec::new();
    if let Err(err) = config.validate() {
        findings.push(LintFinding::new(None, None, LintCode::InvalidConfig, err.to_string()));
    }
    for warning in config.warnings() {
        findings.push(LintFinding::new(
            None,
            Some(&warning.key),
            LintCode::ConfigWarning,
            warning.message,
        ));
    }
    findings
}

// ============================================================================
// SECTION: Tests
// ============================================================================
