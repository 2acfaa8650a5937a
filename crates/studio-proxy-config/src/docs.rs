// crates/studio-proxy-config/src/docs.rs
// ============================================================================
// Module: Env Docs Generator
// Description: Markdown generator for the studio proxy env reference.
// Purpose: Keep env docs in sync with the key registry.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Generates `Docs/configuration/studio-proxy.env.md` from the key registry.
//! The output is deterministic; `verify_config_docs` guards against drift.

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

/// Default output path for generated configuration docs.
pub const DOCS_PATH: &str = "Docs/configuration/studio-proxy.env.md";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the configuration markdown documentation.
#[must_use]
pub fn config_docs_markdown() -> String {
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("Docs/configuration/studio-proxy.env.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: Studio Proxy Environment Reference\n");
    out.push_str("Description: Reference for every key recognized in the .env file.\n");
    out.push_str("Purpose: Document ports, proxy, logging, timeouts, and health settings.\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# Studio Proxy Environment Reference\n\n");
    out.push_str("## Overview\n\n");
    out.push_str("The service reads `KEY=value` lines from `.env` (or the file named by\n");
    out.push_str("`STUDIO_PROXY_ENV_FILE`). Process environment variables override the file\n");
    out.push_str("for recognized keys. Missing keys take the defaults below. Invalid values\n");
    out.push_str("stop startup and name the offending key.\n\n");

    out.push_str("## Sections\n\n");
    for section in Section::ALL {
        out.push_str("### ");
        out.push_str(section.title());
        out.push_str("\n\n");
        out.push_str(section.description());
        out.push_str("\n\n");
        out.push_str("| Key | Type | Default | Description |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for spec in keys_in_section(*section) {
            out.push_str("| `");
            out.push_str(spec.name);
            out.push_str("` | ");
            out.push_str(&escape_table_cell(&spec.kind.label()));
            out.push_str(" | ");
            out.push_str(&format_default(spec.default));
            out.push_str(" | ");
            out.push_str(&escape_table_cell(spec.description));
            out.push_str(" |\n");
        }
        out.push('\n');
    }

    out.push_str("## Cross-Field Rules\n\n");
    out.push_str("- Container ports of enabled services must be distinct, as must host ports.\n");
    out.push_str("- `HOST_STREAM_PORT` is 0 exactly when `STREAM_PORT` is 0.\n");
    out.push_str("- Polling intervals must be shorter than `RESPONSE_COMPLETION_TIMEOUT`.\n");
    out.push_str(
        "- `CLEAR_CHAT_VERIFY_INTERVAL_MS` must not exceed `CLEAR_CHAT_VERIFY_TIMEOUT_MS`.\n",
    );
    out.push_str("- `USERSCRIPT_PATH` is required when `ENABLE_SCRIPT_INJECTION=true`.\n");
    out
}

/// Writes the generated docs to `path` or [`DOCS_PATH`].
///
/// # Errors
///
/// Returns [`DocsError`] when file output fails.
pub fn write_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(path, config_docs_markdown().as_bytes()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the docs drift.
pub fn verify_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != config_docs_markdown() {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Escapes markdown table separators.
fn escape_table_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Formats a default value for display.
fn format_default(value: &str) -> String {
    if value.is_empty() { "(empty)".to_string() } else { format!("`{}`", escape_table_cell(value)) }
}
