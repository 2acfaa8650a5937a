// crates/studio-proxy-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for CLI output.
// Purpose: Centralize user-facing strings behind stable keys.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! All runtime output of the `studio-proxy` binary is rendered through the
//! [`t!`](crate::t) macro. The catalog is English only.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys render as the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (for example, `path`).
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "studio-proxy {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to serialize JSON output: {error}"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path}: {size} bytes exceeds limit {limit}.",
    ),
    ("input.parse_failed", "Failed to parse {kind} at {path}: {error}"),
    ("input.kind.request", "request JSON"),
    ("input.kind.models", "model list"),
    ("config.load_failed", "Failed to load env config: {error}"),
    ("config.validate.ok", "Env config is valid ({source})."),
    ("config.validate.source.defaults", "defaults and process environment"),
    ("config.warning", "warning: {key}: {message}"),
    ("config.lint.read_failed", "Failed to lint {path}: {error}"),
    ("config.lint.clean", "{path}: no findings"),
    ("config.lint.summary", "{path}: {errors} error(s), {warnings} warning(s)"),
    ("config.lint.failed", "Env file {path} has {errors} lint error(s)."),
    ("config.template.write_failed", "Failed to write env template: {error}"),
    ("config.template.written", "Env template written to {path}"),
    ("config.template.check_failed", "Env template check failed: {error}"),
    ("config.template.up_to_date", "Env template is up to date: {path}"),
    ("config.docs.write_failed", "Failed to write config docs: {error}"),
    ("config.docs.written", "Config docs written to {path}"),
    ("config.docs.check_failed", "Config docs check failed: {error}"),
    ("config.docs.up_to_date", "Config docs are up to date: {path}"),
    ("logging.open_failed", "Failed to open log file {path}: {error}"),
    ("cleanup.run_failed", "Cleanup sweep failed: {error}"),
    ("cleanup.start_failed", "Failed to start cleanup service: {error}"),
    ("cleanup.serve.started", "Upload cleanup running for {path}; press Ctrl+C to stop."),
    ("cleanup.serve.signal_failed", "Failed to wait for shutdown signal: {error}"),
    ("cleanup.serve.stopped", "Upload cleanup stopped."),
    ("params.models.load_failed", "Failed to load model data: {error}"),
    ("health.client_failed", "Failed to create health client: {error}"),
    ("health.failed", "Health check failed for {url}: {error}"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

/// Returns the raw catalog entries in declaration order.
#[must_use]
pub fn catalog_entries() -> &'static [(&'static str, &'static str)] {
    CATALOG_EN
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` from the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
