// crates/studio-proxy-config/src/dotenv.rs
// ============================================================================
// Module: Env File Parser
// Description: Parser for `.env`-style `KEY=value` files.
// Purpose: Turn operator-edited env files into ordered, line-tagged entries.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! The env file is a flat list of `KEY=value` assignments with `#` comments.
//! [`parse_env_str`] is strict and fails on the first problem; it backs config
//! loading. [`scan_env_str`] is lenient and collects every entry and issue so
//! lint can report all findings in one pass.
//!
//! ## Syntax
//! - Blank lines and lines starting with `#` are ignored.
//! - An optional `export ` prefix is accepted.
//! - Keys match `[A-Za-z_][A-Za-z0-9_]*`.
//! - Unquoted values are trimmed; ` #` starts an inline comment.
//! - `"..."` values support `\n`, `\t`, `\"` and `\\` escapes; `'...'` values
//!   are literal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum env file size in bytes.
pub const MAX_ENV_FILE_SIZE: usize = 1024 * 1024;

/// Byte-order mark stripped from the start of an env file.
const BOM: char = '\u{feff}';

// ============================================================================
// SECTION: Types
// ============================================================================

/// A single `KEY=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    /// Assignment key as written.
    pub key: String,
    /// Unquoted, unescaped value.
    pub value: String,
    /// 1-based line number of the assignment.
    pub line: usize,
}

/// Parsed env file with unique keys in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    /// Entries in file order.
    entries: Vec<EnvEntry>,
}

impl EnvFile {
    /// Returns the parsed entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[EnvEntry] {
        &self.entries
    }

    /// Returns the value assigned to `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|entry| entry.key == key).map(|entry| entry.value.as_str())
    }

    /// Returns the number of assignments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the file holds no assignments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the entries into a key/value map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.iter().map(|entry| (entry.key.clone(), entry.value.clone())).collect()
    }
}

/// Issue found while scanning an env file leniently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIssue {
    /// Line is not a valid assignment.
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },
    /// Key was already assigned earlier in the file.
    Duplicate {
        /// Duplicated key.
        key: String,
        /// Line of the repeated assignment.
        line: usize,
        /// Line of the first assignment.
        first_line: usize,
    },
}

/// Result of a lenient scan: every assignment plus every issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvScan {
    /// All assignments, duplicates included, in file order.
    pub entries: Vec<EnvEntry>,
    /// Syntax and duplicate issues in file order.
    pub issues: Vec<ScanIssue>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading or parsing env files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DotenvError {
    /// I/O failure while reading the file.
    #[error("env file io error: {0}")]
    Io(String),
    /// File exceeds [`MAX_ENV_FILE_SIZE`].
    #[error("env file exceeds size limit of 1 MiB")]
    TooLarge,
    /// File is not valid UTF-8.
    #[error("env file must be utf-8")]
    NotUtf8,
    /// Line is not a valid assignment.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },
    /// Key is assigned more than once.
    #[error("line {line}: duplicate key {key} (first assigned on line {first_line})")]
    DuplicateKey {
        /// Duplicated key.
        key: String,
        /// Line of the repeated assignment.
        line: usize,
        /// Line of the first assignment.
        first_line: usize,
    },
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Reads an env file from disk with size and encoding limits.
///
/// # Errors
///
/// Returns [`DotenvError`] when the file cannot be read, is too large, or is
/// not UTF-8.
pub fn read_env_text(path: &Path) -> Result<String, DotenvError> {
    let bytes = fs::read(path).map_err(|err| DotenvError::Io(err.to_string()))?;
    if bytes.len() > MAX_ENV_FILE_SIZE {
        return Err(DotenvError::TooLarge);
    }
    String::from_utf8(bytes).map_err(|_| DotenvError::NotUtf8)
}

/// Parses env file text strictly.
///
/// # Errors
///
/// Returns [`DotenvError`] on the first syntax error or duplicate key.
pub fn parse_env_str(input: &str) -> Result<EnvFile, DotenvError> {
    if input.len() > MAX_ENV_FILE_SIZE {
        return Err(DotenvError::TooLarge);
    }
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut entries = Vec::new();
    for (index, raw_line) in strip_bom(input).lines().enumerate() {
        let line = index + 1;
        let parsed = parse_line(raw_line).map_err(|message| DotenvError::Syntax {
            line,
            message,
        })?;
        let Some((key, value)) = parsed else {
            continue;
        };
        if let Some(first_line) = seen.get(&key) {
            return Err(DotenvError::DuplicateKey {
                key,
                line,
                first_line: *first_line,
            });
        }
        seen.insert(key.clone(), line);
        entries.push(EnvEntry {
            key,
            value,
            line,
        });
    }
    Ok(EnvFile {
        entries,
    })
}

/// Scans env file text leniently, collecting every entry and issue.
#[must_use]
pub fn scan_env_str(input: &str) -> EnvScan {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut scan = EnvScan::default();
    for (index, raw_line) in strip_bom(input).lines().enumerate() {
        let line = index + 1;
        match parse_line(raw_line) {
            Ok(None) => {}
            Ok(Some((key, value))) => {
                if let Some(first_line) = seen.get(&key) {
                    scan.issues.push(ScanIssue::Duplicate {
                        key: key.clone(),
                        line,
                        first_line: *first_line,
                    });
                } else {
                    seen.insert(key.clone(), line);
                }
                scan.entries.push(EnvEntry {
                    key,
                    value,
                    line,
                });
            }
            Err(message) => scan.issues.push(ScanIssue::Syntax {
                line,
                message,
            }),
        }
    }
    scan
}

/// Returns true when `key` is a syntactically valid env key.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

// ============================================================================
// SECTION: Line Parsing
// ============================================================================

/// Removes a leading byte-order mark.
fn strip_bom(input: &str) -> &str {
    input.strip_prefix(BOM).unwrap_or(input)
}

/// Parses one line into an optional `(key, value)` pair.
fn parse_line(raw_line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = raw_line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let body = trimmed.strip_prefix("export ").map_or(trimmed, str::trim_start);
    let Some((raw_key, raw_value)) = body.split_once('=') else {
        return Err("expected KEY=value".to_string());
    };
    let key = raw_key.trim();
    if key.is_empty() {
        return Err("missing key before '='".to_string());
    }
    if !is_valid_key(key) {
        return Err(format!("invalid key `{key}`"));
    }
    let value = parse_value_text(raw_value)?;
    Ok(Some((key.to_string(), value)))
}

/// Parses the text to the right of `=`.
fn parse_value_text(raw: &str) -> Result<String, String> {
    let value = raw.trim_start();
    if let Some(rest) = value.strip_prefix('"') {
        return parse_double_quoted(rest);
    }
    if let Some(rest) = value.strip_prefix('\'') {
        return parse_single_quoted(rest);
    }
    Ok(strip_inline_comment(raw).trim().to_string())
}

/// Cuts an unquoted value at the first `#` preceded by whitespace.
fn strip_inline_comment(raw: &str) -> &str {
    let mut previous_is_space = false;
    for (index, ch) in raw.char_indices() {
        if ch == '#' && previous_is_space {
            return &raw[..index];
        }
        previous_is_space = ch.is_whitespace();
    }
    raw
}

/// Parses a double-quoted value body (opening quote already consumed).
fn parse_double_quoted(rest: &str) -> Result<String, String> {
    let mut value = String::new();
    let mut chars = rest.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => {
                check_trailing(&rest[index + 1..])?;
                return Ok(value);
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            other => value.push(other),
        }
    }
    Err("unterminated double-quoted value".to_string())
}

/// Parses a single-quoted value body (opening quote already consumed).
fn parse_single_quoted(rest: &str) -> Result<String, String> {
    let Some(end) = rest.find('\'') else {
        return Err("unterminated single-quoted value".to_string());
    };
    check_trailing(&rest[end + 1..])?;
    Ok(rest[..end].to_string())
}

/// Ensures only whitespace or a comment follows a closing quote.
fn check_trailing(tail: &str) -> Result<(), String> {
    let tail = tail.trim();
    if tail.is_empty() || tail.starts_with('#') {
        Ok(())
    } else {
        Err("unexpected characters after closing quote".to_string())
    }
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

    #[test]
    fn parses_plain_assignments_and_comments() {
        let file = parse_env_str("# header\n\nPORT=2048\nLAUNCH_MODE = headless\n").unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.get("PORT"), Some("2048"));
        assert_eq!(file.get("LAUNCH_MODE"), Some("headless"));
        assert_eq!(file.entries()[1].line, 4);
    }

    #[test]
    fn export_prefix_is_accepted() {
        let file = parse_env_str("export  PORT=9000").unwrap();
        assert_eq!(file.get("PORT"), Some("9000"));
    }

    #[test]
    fn inline_comment_requires_leading_whitespace() {
        let file = parse_env_str("A=value # note\nB=#literal\nC= # only comment").unwrap();
        assert_eq!(file.get("A"), Some("value"));
        assert_eq!(file.get("B"), Some("#literal"));
        assert_eq!(file.get("C"), Some(""));
    }

    #[test]
    fn double_quotes_support_escapes() {
        let file = parse_env_str(r#"A="line\nnext \"q\" \\ \x" # trailing"#).unwrap();
        assert_eq!(file.get("A"), Some("line\nnext \"q\" \\ \\x"));
    }

    #[test]
    fn single_quotes_are_literal() {
        let file = parse_env_str(r"A='  keep \n spaces # too '").unwrap();
        assert_eq!(file.get("A"), Some("  keep \\n spaces # too "));
    }

    #[test]
    fn unterminated_quote_is_syntax_error() {
        let err = parse_env_str("A=\"open").unwrap_err();
        assert!(matches!(err, DotenvError::Syntax { line: 1, .. }));
    }

    #[test]
    fn garbage_after_quote_is_syntax_error() {
        let err = parse_env_str("A='x' y").unwrap_err();
        assert!(err.to_string().contains("after closing quote"));
    }

    #[test]
    fn missing_equals_is_syntax_error() {
        let err = parse_env_str("PORT=1\nJUSTAKEY\n").unwrap_err();
        assert_eq!(
            err,
            DotenvError::Syntax {
                line: 2,
                message: "expected KEY=value".to_string(),
            }
        );
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(parse_env_str("1PORT=1").is_err());
        assert!(parse_env_str("MY-KEY=1").is_err());
        assert!(parse_env_str("=1").is_err());
    }

    #[test]
    fn duplicate_key_names_both_lines() {
        let err = parse_env_str("PORT=1\n# c\nPORT=2").unwrap_err();
        assert_eq!(
            err,
            DotenvError::DuplicateKey {
                key: "PORT".to_string(),
                line: 3,
                first_line: 1,
            }
        );
    }

    #[test]
    fn bom_and_crlf_are_tolerated() {
        let file = parse_env_str("\u{feff}PORT=1\r\nHOST_PORT=2\r\n").unwrap();
        assert_eq!(file.get("PORT"), Some("1"));
        assert_eq!(file.get("HOST_PORT"), Some("2"));
    }

    #[test]
    fn scan_collects_all_issues() {
        let scan = scan_env_str("A=1\nbad line\nA=2\nB='x");
        assert_eq!(scan.entries.len(), 2);
        assert_eq!(scan.issues.len(), 3);
        assert!(matches!(scan.issues[0], ScanIssue::Syntax { line: 2, .. }));
        assert!(matches!(
            scan.issues[1],
            ScanIssue::Duplicate {
                line: 3,
                first_line: 1,
                ..
            }
        ));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let input = "A=".to_string() + &"x".repeat(MAX_ENV_FILE_SIZE);
        assert_eq!(parse_env_str(&input), Err(DotenvError::TooLarge));
    }

    #[test]
    fn key_validity() {
        assert!(is_valid_key("_PRIVATE"));
        assert!(is_valid_key("lower_ok"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("A B"));
    }
}
