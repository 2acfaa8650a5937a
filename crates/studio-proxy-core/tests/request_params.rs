//! Request parameter pipeline tests for studio-proxy-core.
// crates/studio-proxy-core/tests/request_params.rs
// =============================================================================
// Module: Request Parameter Pipeline Tests
// Description: Model resolution feeding parameter resolution and the cache.
// Purpose: Ensure env defaults, model limits, and the apply cache agree.
// =============================================================================

use std::collections::BTreeSet;

use studio_proxy_core::GenerationRequest;
use studio_proxy_core::ModelCatalog;
use studio_proxy_core::ParamsCache;
use studio_proxy_core::models::parse_models;
use studio_proxy_core::params::ParamField;
use studio_proxy_core::resolve_params;

mod common;

type TestResult = Result<(), String>;

const MODELS: &str = r#"[
    {"id": "gemini-2.5-pro", "supported_max_output_tokens": 32768},
    {"id": "gemini-2.5-flash", "supported_max_output_tokens": 16384}
]"#;

fn catalog() -> Result<ModelCatalog, String> {
    let entries = parse_models(MODELS).map_err(|err| err.to_string())?;
    Ok(ModelCatalog::new(entries, BTreeSet::new()))
}

fn request(json: &str) -> Result<GenerationRequest, String> {
    serde_json::from_str(json).map_err(|err| err.to_string())
}

#[test]
fn env_defaults_are_clamped_to_the_resolved_model() -> TestResult {
    let config = common::config_with(&[
        ("DEFAULT_MAX_OUTPUT_TOKENS", "60000"),
        ("DEFAULT_STOP_SEQUENCES", r#"["User:", "  "]"#),
    ])?;
    let catalog = catalog()?;
    let request = request(r#"{"model": "gemini-2.5-flash"}"#)?;
    let model = catalog.resolve(request.model.as_deref(), &config.model);
    if model != "gemini-2.5-flash" {
        return Err(format!("unexpected model {model}"));
    }
    let resolved = resolve_params(&request, &config.generation, catalog.max_output_tokens(&model));
    if resolved.max_output_tokens != 16_384 {
        return Err(format!("expected model ceiling, got {}", resolved.max_output_tokens));
    }
    if resolved.stop_sequences != BTreeSet::from(["User:".to_string()]) {
        return Err("default stop sequences were not normalized".to_string());
    }
    if resolved.adjustments.len() != 1 || resolved.adjustments[0].field != ParamField::MaxOutputTokens
    {
        return Err("token clamp should be the only adjustment".to_string());
    }
    Ok(())
}

#[test]
fn unknown_model_falls_back_to_first_catalog_entry() -> TestResult {
    let config = common::config_with(&[])?;
    let catalog = catalog()?;
    let model = catalog.resolve(Some("gemini-1.0"), &config.model);
    if model != "gemini-2.5-pro" {
        return Err(format!("unexpected fallback {model}"));
    }
    Ok(())
}

#[test]
fn repeated_request_only_reapplies_top_p() -> TestResult {
    let config = common::config_with(&[])?;
    let catalog = catalog()?;
    let cache = ParamsCache::new();
    let request = request(r####"{"temperature": 0.7, "stop": "###"}"####)?;
    let limit = catalog.max_output_tokens("gemini-2.5-pro");

    let first = resolve_params(&request, &config.generation, limit);
    cache.record(&first);
    let second = resolve_params(&request, &config.generation, limit);
    if cache.plan(&second).fields() != vec![ParamField::TopP] {
        return Err("unchanged request should only re-apply top-p".to_string());
    }
    Ok(())
}
