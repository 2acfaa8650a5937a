// crates/studio-proxy-config/src/template.rs
// ============================================================================
// Module: Env Template
// Description: Generator for the canonical `.env.example` file.
// Purpose: Deterministic env template derived from the key registry.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Renders every registered key with its default, grouped by section, with
//! the key description and type as comments. The output lints clean and loads
//! to the same configuration as an empty file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::keys::Section;
use crate::keys::keys_in_section;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for the generated template.
pub const TEMPLATE_PATH: &str = ".env.example";

/// Heavy banner rule.
const RULE: &str = "# ============================================================================";

/// Light banner rule used between sections.
const SECTION_RULE: &str =
    "# ----------------------------------------------------------------------------";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when writing or verifying the template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO failure while reading or writing the template.
    #[error("template io error: {0}")]
    Io(String),
    /// Committed template does not match the generated output.
    #[error("template drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Renders the canonical env template.
#[must_use]
pub fn env_template() -> String {
    let mut out = String::new();
    out.push_str("# .env.example\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str("# Studio Proxy Environment\n");
    out.push_str("# Copy to .env and adjust. Every value shown is the built-in default.\n");
    out.push_str("# Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str(RULE);
    out.push('\n');

    for section in Section::ALL {
        out.push('\n');
        out.push_str(SECTION_RULE);
        out.push('\n');
        out.push_str("# ");
        out.push_str(section.title());
        out.push('\n');
        out.push_str("# ");
        out.push_str(section.description());
        out.push('\n');
        out.push_str(SECTION_RULE);
        out.push('\n');
        for spec in keys_in_section(*section) {
            out.push('\n');
            out.push_str("# ");
            out.push_str(spec.description);
            out.push('\n');
            out.push_str("# Type: ");
            out.push_str(&spec.kind.label());
            out.push('\n');
            out.push_str(spec.name);
            out.push('=');
            out.push_str(&render_value(spec.default));
            out.push('\n');
        }
    }
    out
}

/// Writes the generated template to `path` or [`TEMPLATE_PATH`].
///
/// # Errors
///
/// Returns [`TemplateError`] when file output fails.
pub fn write_env_template(path: Option<&Path>) -> Result<(), TemplateError> {
    let path = path.unwrap_or_else(|| Path::new(TEMPLATE_PATH));
    fs::write(path, env_template().as_bytes()).map_err(|err| TemplateError::Io(err.to_string()))
}

/// Verifies the on-disk template matches the generated output.
///
/// # Errors
///
/// Returns [`TemplateError`] when the template cannot be read or drifts.
pub fn verify_env_template(path: Option<&Path>) -> Result<(), TemplateError> {
    let path = path.unwrap_or_else(|| Path::new(TEMPLATE_PATH));
    let existing = fs::read_to_string(path).map_err(|err| TemplateError::Io(err.to_string()))?;
    if existing != env_template() {
        return Err(TemplateError::Drift(format!("template mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Quotes a value when the unquoted form would not round-trip.
fn render_value(value: &str) -> String {
    let needs_quotes = value.chars().any(|ch| ch.is_whitespace() || matches!(ch, '#' | '"' | '\''));
    if !needs_quotes {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;
    use crate::dotenv::parse_env_str;

    #[test]
    fn render_value_quotes_only_when_needed() {
        assert_eq!(render_value("2048"), "2048");
        assert_eq!(render_value(""), "");
        assert_eq!(render_value("no model list"), "\"no model list\"");
        assert_eq!(render_value("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn quoted_values_round_trip() {
        for value in ["no model list", "a # b", "it's", "tab\there"] {
            let text = format!("KEY={}\n", render_value(value));
            let file = parse_env_str(&text).unwrap();
            assert_eq!(file.get("KEY"), Some(value));
        }
    }
}
