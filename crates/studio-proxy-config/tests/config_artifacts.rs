//! Config artifact validation tests for studio-proxy-config.
// crates/studio-proxy-config/tests/config_artifacts.rs
// ============================================================================
// Module: Config Artifact Validation Tests
// Description: Validate env template, schema, and docs generators.
// Purpose: Prevent drift between the key registry and generated artifacts.
// Dependencies: studio-proxy-config, jsonschema, tempfile
// ============================================================================

use std::collections::BTreeMap;
use std::fs;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use serde_json::json;
use studio_proxy_config::DocsError;
use studio_proxy_config::KEY_SPECS;
use studio_proxy_config::ProxyConfig;
use studio_proxy_config::TemplateError;
use studio_proxy_config::config_docs_markdown;
use studio_proxy_config::config_schema;
use studio_proxy_config::default_values;
use studio_proxy_config::env_template;
use studio_proxy_config::lint_env_str;
use studio_proxy_config::parse_env_str;
use studio_proxy_config::verify_config_docs;
use studio_proxy_config::verify_env_template;
use studio_proxy_config::write_config_docs;
use studio_proxy_config::write_env_template;

type TestResult = Result<(), String>;

fn schema_validator() -> Result<Validator, String> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&config_schema())
        .map_err(|err| err.to_string())
}

#[test]
fn template_lints_clean() -> TestResult {
    let report = lint_env_str(&env_template());
    if !report.is_clean() {
        let messages: Vec<String> = report.findings.iter().map(ToString::to_string).collect();
        return Err(messages.join("; "));
    }
    Ok(())
}

#[test]
fn template_loads_to_default_config() -> TestResult {
    let file = parse_env_str(&env_template()).map_err(|err| err.to_string())?;
    if file.len() != KEY_SPECS.len() {
        return Err(format!("template has {} keys, registry {}", file.len(), KEY_SPECS.len()));
    }
    let from_template = ProxyConfig::from_values(&file.to_map()).map_err(|err| err.to_string())?;
    let empty = ProxyConfig::from_values(&BTreeMap::new()).map_err(|err| err.to_string())?;
    if from_template != empty {
        return Err("template should load to the default config".to_string());
    }
    Ok(())
}

#[test]
fn template_is_deterministic_and_sectioned() -> TestResult {
    let first = env_template();
    if first != env_template() {
        return Err("template output is not deterministic".to_string());
    }
    for heading in ["# Ports\n", "# Timeouts\n", "# Health Check\n"] {
        if !first.contains(heading) {
            return Err(format!("template missing section {heading}"));
        }
    }
    if !first.contains("DEFAULT_FALLBACK_MODEL_ID=\"no model list\"\n") {
        return Err("values with spaces should be quoted".to_string());
    }
    Ok(())
}

#[test]
fn template_write_and_verify_detect_drift() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join(".env.example");
    write_env_template(Some(&path)).map_err(|err| err.to_string())?;
    verify_env_template(Some(&path)).map_err(|err| err.to_string())?;
    fs::write(&path, "PORT=1\n").map_err(|err| err.to_string())?;
    match verify_env_template(Some(&path)) {
        Err(TemplateError::Drift(_)) => Ok(()),
        Err(other) => Err(format!("expected drift, got {other}")),
        Ok(()) => Err("edited template should drift".to_string()),
    }
}

#[test]
fn schema_defaults_match_registry() -> TestResult {
    let schema = config_schema();
    for spec in KEY_SPECS {
        let pointer = format!("/properties/{}/default", spec.name);
        let actual = schema.pointer(&pointer).ok_or_else(|| format!("missing {pointer}"))?;
        if actual != &json!(spec.default) {
            return Err(format!("schema default mismatch for {}", spec.name));
        }
    }
    Ok(())
}

#[test]
fn schema_accepts_defaults_and_unknown_keys() -> TestResult {
    let validator = schema_validator()?;
    let defaults = serde_json::to_value(default_values()).map_err(|err| err.to_string())?;
    if !validator.is_valid(&defaults) {
        return Err("default value map should validate".to_string());
    }
    if !validator.is_valid(&json!({})) {
        return Err("empty env should validate".to_string());
    }
    if !validator.is_valid(&json!({ "SOME_OTHER_KEY": "x" })) {
        return Err("unknown keys should be allowed".to_string());
    }
    Ok(())
}

#[test]
fn schema_rejects_malformed_values() -> TestResult {
    let validator = schema_validator()?;
    let cases: [Value; 6] = [
        json!({ "PORT": "http" }),
        json!({ "ENABLE_URL_CONTEXT": "maybe" }),
        json!({ "LAUNCH_MODE": "windowed" }),
        json!({ "DOCKER_HEALTHCHECK_INTERVAL": "30" }),
        json!({ "HTTP_PROXY": "proxy.local:8080" }),
        json!({ "MODEL_NAME": 5 }),
    ];
    for case in &cases {
        if validator.is_valid(case) {
            return Err(format!("schema should reject {case}"));
        }
    }
    Ok(())
}

#[test]
fn schema_and_loader_agree_on_value_syntax() -> TestResult {
    let validator = schema_validator()?;
    let cases: [(&str, &str, bool); 14] = [
        ("PORT", "+8080", true),
        ("PORT", " 8080 ", true),
        ("PORT", "-1", false),
        ("PORT", "8080x", false),
        ("UPLOAD_FILE_RETENTION_DAYS", "+7", true),
        ("UPLOAD_FILE_RETENTION_DAYS", " 14 ", true),
        ("RESPONSE_COMPLETION_TIMEOUT", "+300000", true),
        ("DEFAULT_TEMPERATURE", " .5 ", true),
        ("DEFAULT_TEMPERATURE", "warm", false),
        ("DOCKER_HEALTHCHECK_INTERVAL", " 1m30s ", true),
        ("DOCKER_HEALTHCHECK_INTERVAL", "30", false),
        ("MODEL_NAME", "  studio  ", true),
        ("MODEL_NAME", "   ", false),
        ("HTTP_PROXY", " http://proxy.local:8080 ", true),
    ];
    for (key, value, expected) in cases {
        let schema_ok = validator.is_valid(&json!({ key: value }));
        let values = BTreeMap::from([(key.to_string(), value.to_string())]);
        let loader_ok = ProxyConfig::from_values(&values).is_ok();
        if schema_ok != expected || loader_ok != expected {
            return Err(format!(
                "{key}=`{value}`: schema {schema_ok}, loader {loader_ok}, expected {expected}"
            ));
        }
    }
    Ok(())
}

#[test]
fn docs_list_every_key() -> TestResult {
    let docs = config_docs_markdown();
    if !docs.contains("# Studio Proxy Environment Reference") {
        return Err("docs missing title header".to_string());
    }
    for spec in KEY_SPECS {
        if !docs.contains(&format!("| `{}` |", spec.name)) {
            return Err(format!("docs missing {}", spec.name));
        }
    }
    Ok(())
}

#[test]
fn docs_write_and_verify_detect_drift() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("nested").join("env.md");
    write_config_docs(Some(&path)).map_err(|err| err.to_string())?;
    verify_config_docs(Some(&path)).map_err(|err| err.to_string())?;
    fs::write(&path, "stale").map_err(|err| err.to_string())?;
    match verify_config_docs(Some(&path)) {
        Err(DocsError::Drift(_)) => Ok(()),
        Err(other) => Err(format!("expected drift, got {other}")),
        Ok(()) => Err("edited docs should drift".to_string()),
    }
}
