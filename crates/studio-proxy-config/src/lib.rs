// crates/studio-proxy-config/src/lib.rs
// ============================================================================
// Module: Studio Proxy Config Library
// Description: Env-file parsing, key registry, typed config, and generators.
// Purpose: Single source of truth for the studio proxy `.env` semantics.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! `studio-proxy-config` defines the canonical configuration model for the
//! studio proxy service. Every recognized key lives in one registry, from
//! which the typed loader, lint pass, env template, markdown docs, and JSON
//! schema are all derived. Loading is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod docs;
pub mod dotenv;
pub mod keys;
pub mod lint;
pub mod schema;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use docs::DOCS_PATH;
pub use docs::DocsError;
pub use docs::config_docs_markdown;
pub use docs::verify_config_docs;
pub use docs::write_config_docs;
pub use dotenv::DotenvError;
pub use dotenv::EnvFile;
pub use dotenv::parse_env_str;
pub use keys::KEY_SPECS;
pub use keys::KeySpec;
pub use keys::Section;
pub use keys::ValueKind;
pub use lint::LintCode;
pub use lint::LintError;
pub use lint::LintFinding;
pub use lint::LintReport;
pub use lint::Severity;
pub use lint::lint_env_file;
pub use lint::lint_env_str;
pub use schema::config_schema;
pub use template::TEMPLATE_PATH;
pub use template::TemplateError;
pub use template::env_template;
pub use template::verify_env_template;
pub use template::write_env_template;
