// crates/studio-proxy-config/src/schema.rs
// ============================================================================
// Module: Env Schema
// Description: JSON schema builder for the studio proxy env file.
// Purpose: Provide a canonical validation schema for env artifacts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The env file is modelled as a flat JSON object of string values, one
//! property per registered key. Defaults and descriptions come straight from
//! the key registry. Booleans and enums are constrained to their canonical
//! spellings; lint accepts the other spellings with a warning. Unknown keys
//! are allowed because lint only warns about them.
//!
//! Numeric, duration, and text patterns follow the loader: values are
//! trimmed before parsing, and integers may carry a leading `+`. Range limits
//! are not encoded; they are reported by the loader and lint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::keys::KEY_SPECS;
use crate::keys::KeySpec;
use crate::keys::PROXY_SCHEMES;
use crate::keys::ValueKind;

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Pattern for unsigned integers (ports, milliseconds).
const UNSIGNED_PATTERN: &str = r"^\s*\+?[0-9]+\s*$";
/// Pattern for signed integers.
const SIGNED_PATTERN: &str = r"^\s*[+-]?[0-9]+\s*$";
/// Pattern for decimal numbers.
const FLOAT_PATTERN: &str = r"^\s*[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?\s*$";
/// Pattern for Docker-style durations.
const DURATION_PATTERN: &str = r"^\s*([0-9]+(ms|s|m|h))+\s*$";
/// Pattern for text that is non-empty after trimming.
const NON_BLANK_PATTERN: &str = r"\S";
/// Pattern for comma or semicolon separated host patterns.
const HOST_LIST_PATTERN: &str = r"^\s*[^\s,;]*(\s*[,;]\s*[^\s,;]*)*\s*$";

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Returns the JSON schema for the env file.
#[must_use]
pub fn config_schema() -> Value {
    let mut properties = Map::new();
    for spec in KEY_SPECS {
        properties.insert(spec.name.to_string(), key_schema(spec));
    }
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "studio-proxy://schemas/env.schema.json",
        "title": "Studio Proxy Environment",
        "description": "Environment file for the studio proxy service, viewed as string values.",
        "type": "object",
        "properties": properties,
        "additionalProperties": { "type": "string" }
    })
}

/// Builds the property schema for a single key.
fn key_schema(spec: &KeySpec) -> Value {
    let mut schema = json!({
        "type": "string",
        "default": spec.default,
        "description": spec.description,
        "x-section": spec.section.title(),
        "x-kind": spec.kind.label(),
    });
    let Some(object) = schema.as_object_mut() else {
        return schema;
    };
    match spec.kind {
        ValueKind::Port {
            ..
        } => {
            object.insert("pattern".to_string(), json!(UNSIGNED_PATTERN));
        }
        ValueKind::Integer {
            ..
        } => {
            object.insert("pattern".to_string(), json!(SIGNED_PATTERN));
        }
        ValueKind::Float {
            ..
        } => {
            object.insert("pattern".to_string(), json!(FLOAT_PATTERN));
        }
        ValueKind::Millis {
            ..
        } => {
            object.insert("pattern".to_string(), json!(UNSIGNED_PATTERN));
        }
        ValueKind::Bool => {
            object.insert("enum".to_string(), json!(["true", "false"]));
        }
        ValueKind::Enum(options) => {
            object.insert("enum".to_string(), json!(options));
        }
        ValueKind::DockerDuration => {
            object.insert("pattern".to_string(), json!(DURATION_PATTERN));
        }
        ValueKind::JsonStringArray => {
            object.insert("contentMediaType".to_string(), json!("application/json"));
        }
        ValueKind::Text {
            allow_empty,
        } => {
            if !allow_empty {
                object.insert("pattern".to_string(), json!(NON_BLANK_PATTERN));
            }
        }
        ValueKind::ProxyUrl => {
            let pattern = format!(r"^\s*$|^\s*({})://\S+\s*$", PROXY_SCHEMES.join("|"));
            object.insert("pattern".to_string(), json!(pattern));
        }
        ValueKind::HostList => {
            object.insert("pattern".to_string(), json!(HOST_LIST_PATTERN));
        }
    }
    schema
}
