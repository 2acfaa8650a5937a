// crates/studio-proxy-core/src/models.rs
// ============================================================================
// Module: Model Catalog
// Description: Model list filtering, token limits, and completion ids.
// Purpose: Resolve requested models against the catalog and exclusions.
// Dependencies: rand, serde, serde_json, studio-proxy-config
// ============================================================================

//! ## Overview
//! The model list is a JSON array of [`ModelEntry`] values. Ids listed in the
//! excluded-models file are hidden. When a requested model is unavailable the
//! first catalog model is used, then `DEFAULT_FALLBACK_MODEL_ID`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;
use studio_proxy_config::ModelConfig;
use thiserror::Error;

use crate::params::DEFAULT_MODEL_MAX_OUTPUT_TOKENS;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One model from the model list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Model id.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Output token ceiling reported for the model.
    #[serde(default)]
    pub supported_max_output_tokens: Option<i64>,
}

/// Errors raised while loading model data.
#[derive(Debug, Error)]
pub enum ModelError {
    /// I/O failure while reading a model file.
    #[error("model io error: {0}")]
    Io(String),
    /// Model list is not valid JSON.
    #[error("model list parse error: {0}")]
    Parse(String),
}

/// Model list with exclusions applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    /// Visible models in list order.
    entries: Vec<ModelEntry>,
    /// Excluded model ids.
    excluded: BTreeSet<String>,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

impl ModelCatalog {
    /// Builds a catalog, dropping excluded ids and keeping list order.
    #[must_use]
    pub fn new(entries: Vec<ModelEntry>, excluded: BTreeSet<String>) -> Self {
        let entries = entries.into_iter().filter(|entry| !excluded.contains(&entry.id)).collect();
        Self {
            entries,
            excluded,
        }
    }

    /// Returns the visible models.
    #[must_use]
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Returns the visible model with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Returns true when `id` is excluded.
    #[must_use]
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded.contains(id)
    }

    /// Returns the output token ceiling for `id`.
    #[must_use]
    pub fn max_output_tokens(&self, id: &str) -> u32 {
        self.get(id)
            .and_then(|entry| entry.supported_max_output_tokens)
            .filter(|limit| *limit > 0)
            .and_then(|limit| u32::try_from(limit).ok())
            .unwrap_or(DEFAULT_MODEL_MAX_OUTPUT_TOKENS)
    }

    /// Resolves the model id to use for a request.
    #[must_use]
    pub fn resolve(&self, requested: Option<&str>, config: &ModelConfig) -> String {
        if let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty())
            && self.get(id).is_some()
        {
            return id.to_string();
        }
        self.entries
            .first()
            .map_or_else(|| config.fallback_model_id.clone(), |entry| entry.id.clone())
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Parses a JSON model list.
///
/// # Errors
///
/// Returns [`ModelError::Parse`] when the text is not a model array.
pub fn parse_models(text: &str) -> Result<Vec<ModelEntry>, ModelError> {
    serde_json::from_str(text).map_err(|err| ModelError::Parse(err.to_string()))
}

/// Reads a JSON model list from `path`.
///
/// # Errors
///
/// Returns [`ModelError`] when the file cannot be read or parsed.
pub fn load_models(path: &Path) -> Result<Vec<ModelEntry>, ModelError> {
    let text = fs::read_to_string(path).map_err(|err| ModelError::Io(err.to_string()))?;
    parse_models(&text)
}

/// Reads excluded model ids, one per line; a missing file is empty.
///
/// # Errors
///
/// Returns [`ModelError::Io`] when an existing file cannot be read.
pub fn load_excluded_models(path: &Path) -> Result<BTreeSet<String>, ModelError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(err) => return Err(ModelError::Io(err.to_string())),
    };
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect())
}

/// Builds a chat completion id: prefix, epoch millis, and a random suffix.
#[must_use]
pub fn completion_id(prefix: &str, now: SystemTime) -> String {
    let millis = now.duration_since(UNIX_EPOCH).map(|duration| duration.as_millis()).unwrap_or(0);
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    format!("{prefix}{millis}-{:08x}", u32::from_be_bytes(bytes))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
