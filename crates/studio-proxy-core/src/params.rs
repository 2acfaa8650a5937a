// crates/studio-proxy-core/src/params.rs
// ============================================================================
// Module: Generation Parameters
// Description: Per-request parameter resolution against env defaults.
// Purpose: Clamp request parameters and plan which ones need re-applying.
// Dependencies: serde, serde_json, studio-proxy-config
// ============================================================================

//! ## Overview
//! A chat request may carry temperature, output token limit, top-p, stop
//! sequences, reasoning effort, and tools. [`resolve_params`] fills gaps from
//! [`GenerationConfig`], clamps every numeric value into its supported range,
//! and records each clamp as a [`ParamAdjustment`].
//!
//! [`ParamsCache`] remembers the values last applied to the page so only the
//! fields that changed are re-applied. Top-p is never cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use studio_proxy_config::GenerationConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Inclusive temperature bounds.
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
/// Inclusive top-p bounds.
pub const TOP_P_RANGE: (f64, f64) = (0.0, 1.0);
/// Output token ceiling when a model reports no usable limit.
pub const DEFAULT_MODEL_MAX_OUTPUT_TOKENS: u32 = 65_536;
/// Temperatures closer than this are treated as unchanged.
pub const TEMPERATURE_TOLERANCE: f64 = 0.001;
/// Thinking budget for `reasoning_effort = "low"`.
pub const LOW_EFFORT_BUDGET: i64 = 1_000;
/// Thinking budget for `reasoning_effort = "medium"`.
pub const MEDIUM_EFFORT_BUDGET: i64 = 8_000;
/// Thinking budget for `reasoning_effort = "high"`.
pub const HIGH_EFFORT_BUDGET: i64 = 24_000;
/// Function name that requests search grounding.
const GOOGLE_SEARCH_FUNCTION: &str = "googleSearch";

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Generation parameters carried by a chat request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationRequest {
    /// Requested model id.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Output token limit.
    #[serde(alias = "max_tokens")]
    pub max_output_tokens: Option<i64>,
    /// Nucleus sampling threshold.
    pub top_p: Option<f64>,
    /// Stop sequence or sequences; absent means the env default.
    #[serde(default, deserialize_with = "deserialize_stop")]
    pub stop: Option<StopSequences>,
    /// Reasoning effort label or explicit budget.
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Tool declarations.
    pub tools: Option<Vec<Value>>,
}

/// Stop sequences given as one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    /// Single stop sequence.
    One(String),
    /// Several stop sequences.
    Many(Vec<String>),
    /// Explicit `null`: no stop sequences.
    #[serde(skip_deserializing)]
    Cleared,
}

/// Maps an explicit `null` stop to [`StopSequences::Cleared`].
fn deserialize_stop<'de, D>(deserializer: D) -> Result<Option<StopSequences>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StopSequences>::deserialize(deserializer)
        .map(|stop| Some(stop.unwrap_or(StopSequences::Cleared)))
}

/// Reasoning effort given as an explicit budget or a label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReasoningEffort {
    /// Explicit token budget.
    Budget(i64),
    /// Effort label such as `low` or a numeric string.
    Label(String),
}

// ============================================================================
// SECTION: Resolved Types
// ============================================================================

/// Parameters after defaults and clamping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParams {
    /// Temperature in `[0, 2]`.
    pub temperature: f64,
    /// Output token limit in `[1, model limit]`.
    pub max_output_tokens: u32,
    /// Top-p in `[0, 1]`.
    pub top_p: f64,
    /// Trimmed, non-empty, de-duplicated stop sequences.
    pub stop_sequences: BTreeSet<String>,
    /// URL context tool switch.
    pub url_context: bool,
    /// Thinking budget setting.
    pub thinking: ThinkingSetting,
    /// Search grounding switch.
    pub google_search: bool,
    /// Clamps applied to requested values.
    pub adjustments: Vec<ParamAdjustment>,
}

/// Thinking budget toggle and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThinkingSetting {
    /// Whether the thinking budget is enabled.
    pub enabled: bool,
    /// Budget to apply; `None` leaves the current budget untouched.
    pub budget: Option<i64>,
}

/// A requested value replaced by a clamped one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamAdjustment {
    /// Parameter name.
    pub field: ParamField,
    /// Value as requested.
    pub requested: Value,
    /// Value actually applied.
    pub applied: Value,
}

/// Generation parameter identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    /// Temperature.
    Temperature,
    /// Output token limit.
    MaxOutputTokens,
    /// Top-p.
    TopP,
    /// Stop sequences.
    StopSequences,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves request parameters against env defaults and the model limit.
///
/// `model_limit` is the model's output token ceiling; `0` falls back to
/// [`DEFAULT_MODEL_MAX_OUTPUT_TOKENS`].
#[must_use]
pub fn resolve_params(
    request: &GenerationRequest,
    defaults: &GenerationConfig,
    model_limit: u32,
) -> ResolvedParams {
    let mut adjustments = Vec::new();
    let limit = if model_limit == 0 { DEFAULT_MODEL_MAX_OUTPUT_TOKENS } else { model_limit };

    let temperature = clamp_float(
        ParamField::Temperature,
        request.temperature,
        defaults.temperature,
        TEMPERATURE_RANGE,
        &mut adjustments,
    );
    let top_p = clamp_float(
        ParamField::TopP,
        request.top_p,
        defaults.top_p,
        TOP_P_RANGE,
        &mut adjustments,
    );

    let requested_tokens =
        request.max_output_tokens.unwrap_or_else(|| i64::from(defaults.max_output_tokens));
    let clamped_tokens = requested_tokens.clamp(1, i64::from(limit));
    if clamped_tokens != requested_tokens {
        adjustments.push(ParamAdjustment {
            field: ParamField::MaxOutputTokens,
            requested: json!(requested_tokens),
            applied: json!(clamped_tokens),
        });
    }
    let max_output_tokens = u32::try_from(clamped_tokens).unwrap_or(limit);

    let stop_sequences = match &request.stop {
        Some(StopSequences::One(single)) => normalize_stops(std::slice::from_ref(single)),
        Some(StopSequences::Many(list)) => normalize_stops(list),
        Some(StopSequences::Cleared) => BTreeSet::new(),
        None => normalize_stops(&defaults.stop_sequences),
    };

    let thinking = match &request.reasoning_effort {
        Some(effort) => ThinkingSetting {
            enabled: true,
            budget: parse_thinking_budget(Some(effort), defaults.thinking_budget),
        },
        None => ThinkingSetting {
            enabled: defaults.enable_thinking_budget,
            budget: defaults.enable_thinking_budget.then(|| i64::from(defaults.thinking_budget)),
        },
    };

    let google_search = request
        .tools
        .as_ref()
        .map_or(defaults.enable_google_search, |tools| tools.iter().any(requests_google_search));

    ResolvedParams {
        temperature,
        max_output_tokens,
        top_p,
        stop_sequences,
        url_context: defaults.enable_url_context,
        thinking,
        google_search,
        adjustments,
    }
}

/// Maps a reasoning effort to a thinking budget.
///
/// Absent or `"none"` yields `default_budget`; integers and integer strings
/// are used as-is; `low`, `medium`, and `high` map to fixed budgets. Any other
/// label yields `None`, meaning the budget is left unchanged.
#[must_use]
pub fn parse_thinking_budget(effort: Option<&ReasoningEffort>, default_budget: u32) -> Option<i64> {
    match effort {
        None => Some(i64::from(default_budget)),
        Some(ReasoningEffort::Budget(value)) => Some(*value),
        Some(ReasoningEffort::Label(label)) => {
            let label = label.trim().to_ascii_lowercase();
            match label.as_str() {
                "none" => Some(i64::from(default_budget)),
                "low" => Some(LOW_EFFORT_BUDGET),
                "medium" => Some(MEDIUM_EFFORT_BUDGET),
                "high" => Some(HIGH_EFFORT_BUDGET),
                other => other.parse().ok(),
            }
        }
    }
}

/// Returns true when a tool declaration asks for search grounding.
fn requests_google_search(tool: &Value) -> bool {
    let retrieval = tool.get("google_search_retrieval").is_some_and(|value| !value.is_null());
    let function = tool.pointer("/function/name").and_then(Value::as_str)
        == Some(GOOGLE_SEARCH_FUNCTION);
    retrieval || function
}

/// Picks the requested or default value and clamps it into `range`.
fn clamp_float(
    field: ParamField,
    requested: Option<f64>,
    default: f64,
    range: (f64, f64),
    adjustments: &mut Vec<ParamAdjustment>,
) -> f64 {
    let (min, max) = range;
    let Some(value) = requested else {
        return default.clamp(min, max);
    };
    if !value.is_finite() {
        adjustments.push(ParamAdjustment {
            field,
            requested: Value::Null,
            applied: json!(default),
        });
        return default.clamp(min, max);
    }
    let clamped = value.clamp(min, max);
    if (clamped - value).abs() > f64::EPSILON {
        adjustments.push(ParamAdjustment {
            field,
            requested: json!(value),
            applied: json!(clamped),
        });
    }
    clamped
}

/// Trims stop sequences and drops empty ones.
fn normalize_stops(stops: &[String]) -> BTreeSet<String> {
    stops
        .iter()
        .map(|stop| stop.trim())
        .filter(|stop| !stop.is_empty())
        .map(ToString::to_string)
        .collect()
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Fields that must be re-applied for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParamPlan {
    /// Temperature differs from the cached value.
    pub temperature: bool,
    /// Output token limit differs from the cached value.
    pub max_output_tokens: bool,
    /// Stop sequences differ from the cached set.
    pub stop_sequences: bool,
    /// Top-p; always re-applied.
    pub top_p: bool,
}

impl ParamPlan {
    /// Returns the fields to apply, in application order.
    #[must_use]
    pub fn fields(&self) -> Vec<ParamField> {
        let mut fields = Vec::new();
        if self.temperature {
            fields.push(ParamField::Temperature);
        }
        if self.max_output_tokens {
            fields.push(ParamField::MaxOutputTokens);
        }
        if self.stop_sequences {
            fields.push(ParamField::StopSequences);
        }
        if self.top_p {
            fields.push(ParamField::TopP);
        }
        fields
    }
}

/// Last applied parameter values.
#[derive(Debug, Default)]
struct CacheState {
    /// Applied temperature.
    temperature: Option<f64>,
    /// Applied output token limit.
    max_output_tokens: Option<u32>,
    /// Applied stop sequences.
    stop_sequences: Option<BTreeSet<String>>,
}

/// Cache of parameter values already applied to the page.
#[derive(Debug, Default)]
pub struct ParamsCache {
    /// Guarded cache state.
    state: Mutex<CacheState>,
}

impl ParamsCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns which fields need re-applying for `resolved`.
    #[must_use]
    pub fn plan(&self, resolved: &ResolvedParams) -> ParamPlan {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        ParamPlan {
            temperature: state.temperature.is_none_or(|cached| {
                (cached - resolved.temperature).abs() >= TEMPERATURE_TOLERANCE
            }),
            max_output_tokens: state.max_output_tokens != Some(resolved.max_output_tokens),
            stop_sequences: state.stop_sequences.as_ref() != Some(&resolved.stop_sequences),
            top_p: true,
        }
    }

    /// Stores the values of `resolved` as applied.
    pub fn record(&self, resolved: &ResolvedParams) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.temperature = Some(resolved.temperature);
        state.max_output_tokens = Some(resolved.max_output_tokens);
        state.stop_sequences = Some(resolved.stop_sequences.clone());
    }

    /// Forgets the cached value of `field` after a failed apply.
    pub fn invalidate(&self, field: ParamField) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match field {
            ParamField::Temperature => state.temperature = None,
            ParamField::MaxOutputTokens => state.max_output_tokens = None,
            ParamField::StopSequences => state.stop_sequences = None,
            ParamField::TopP => {}
        }
    }

    /// Forgets every cached value.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = CacheState::default();
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
