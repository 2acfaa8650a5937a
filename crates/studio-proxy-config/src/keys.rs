// crates/studio-proxy-config/src/keys.rs
// ============================================================================
// Module: Env Key Registry
// Description: Canonical list of recognized env keys, kinds and defaults.
// Purpose: Single source of truth for loading, lint, template, docs, schema.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! Every recognized key is declared once in [`KEY_SPECS`] with its section,
//! value kind, default and description. The typed loader, lint pass, env
//! template, markdown docs and JSON schema are all derived from this table,
//! so adding a key here is the only step needed to surface it everywhere.
//!
//! ## Invariants
//! - Key names are unique and uppercase.
//! - Every default parses under its own kind and is canonically spelled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound for millisecond timeouts (one hour).
pub const MAX_MILLIS: u64 = 3_600_000;

/// Proxy URL schemes accepted for proxy keys.
pub const PROXY_SCHEMES: &[&str] = &["http", "https", "socks4", "socks5", "socks5h"];

/// Canonical spellings for `SERVER_LOG_LEVEL`.
pub const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

/// Canonical spellings for `LAUNCH_MODE`.
pub const LAUNCH_MODES: &[&str] =
    &["normal", "headless", "virtual_display", "direct_debug_no_browser"];

/// Accepted truthy spellings for boolean values.
const TRUE_VALUES: &[&str] = &["true", "1", "yes", "on"];

/// Accepted falsy spellings for boolean values.
const FALSE_VALUES: &[&str] = &["false", "0", "no", "off"];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Value interpretation for an env key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    /// TCP port; zero optionally disables the service.
    Port {
        /// Whether `0` is accepted.
        allow_zero: bool,
    },
    /// Signed integer with an inclusive range.
    Integer {
        /// Minimum accepted value.
        min: i64,
        /// Maximum accepted value.
        max: i64,
    },
    /// Finite float with an inclusive range.
    Float {
        /// Minimum accepted value.
        min: f64,
        /// Maximum accepted value.
        max: f64,
    },
    /// Boolean flag.
    Bool,
    /// One of a fixed set of options, matched case-insensitively.
    Enum(&'static [&'static str]),
    /// Duration in integer milliseconds with an inclusive range.
    Millis {
        /// Minimum accepted value.
        min: u64,
        /// Maximum accepted value.
        max: u64,
    },
    /// Docker-style duration such as `30s` or `1m30s`.
    DockerDuration,
    /// JSON array of strings.
    JsonStringArray,
    /// Free-form text.
    Text {
        /// Whether an empty value is accepted.
        allow_empty: bool,
    },
    /// Optional proxy URL; empty disables.
    ProxyUrl,
    /// Comma- or semicolon-separated host patterns.
    HostList,
}

impl ValueKind {
    /// Returns a short type label used in docs and lint messages.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Port {
                allow_zero: true,
            } => "port (0 disables)".to_string(),
            Self::Port {
                allow_zero: false,
            } => "port".to_string(),
            Self::Integer {
                min,
                max,
            } => format!("integer ({min}-{max})"),
            Self::Float {
                min,
                max,
            } => format!("float ({min}-{max})"),
            Self::Bool => "bool".to_string(),
            Self::Enum(options) => format!("enum ({})", options.join(", ")),
            Self::Millis {
                min,
                max,
            } => format!("milliseconds ({min}-{max})"),
            Self::DockerDuration => "duration (e.g. 30s, 1m30s)".to_string(),
            Self::JsonStringArray => "JSON string array".to_string(),
            Self::Text {
                allow_empty: true,
            } => "string (may be empty)".to_string(),
            Self::Text {
                allow_empty: false,
            } => "string".to_string(),
            Self::ProxyUrl => "proxy URL (may be empty)".to_string(),
            Self::HostList => "host list".to_string(),
        }
    }
}

/// Logical grouping of keys in the template and docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    /// Host and container ports.
    Ports,
    /// Outbound proxy settings.
    Proxy,
    /// Log level and debug switches.
    Logging,
    /// Authentication state handling.
    Auth,
    /// Browser launch behavior.
    Browser,
    /// Default generation parameters.
    Generation,
    /// Upload retention and cleanup.
    Cleanup,
    /// Browser interaction timeouts.
    Timeouts,
    /// Userscript injection.
    Scripts,
    /// Model naming and identifiers.
    Model,
    /// Container health checks.
    Health,
}

impl Section {
    /// All sections in render order.
    pub const ALL: &'static [Self] = &[
        Self::Ports,
        Self::Proxy,
        Self::Logging,
        Self::Auth,
        Self::Browser,
        Self::Generation,
        Self::Cleanup,
        Self::Timeouts,
        Self::Scripts,
        Self::Model,
        Self::Health,
    ];

    /// Returns the section heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Ports => "Ports",
            Self::Proxy => "Proxy",
            Self::Logging => "Logging",
            Self::Auth => "Auth",
            Self::Browser => "Browser",
            Self::Generation => "Generation Defaults",
            Self::Cleanup => "Upload Cleanup",
            Self::Timeouts => "Timeouts",
            Self::Scripts => "Script Injection",
            Self::Model => "Model",
            Self::Health => "Health Check",
        }
    }

    /// Returns a one-line section description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ports => "Container ports and the host ports they are published on.",
            Self::Proxy => "Outbound proxy used by the browser and API clients.",
            Self::Logging => "Server log level and verbose logging switches.",
            Self::Auth => "Saving and confirming browser authentication state.",
            Self::Browser => "How the automation browser is launched.",
            Self::Generation => "Defaults applied when a request omits a generation parameter.",
            Self::Cleanup => "Retention and sweep interval for uploaded files.",
            Self::Timeouts => "Polling, silence, click, clipboard and element-wait timeouts.",
            Self::Scripts => "Userscript injected into the browser page.",
            Self::Model => "Model naming, completion id prefix and fallback model.",
            Self::Health => "Docker health check schedule.",
        }
    }
}

/// Declaration of a single env key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySpec {
    /// Uppercase key name.
    pub name: &'static str,
    /// Section the key is grouped under.
    pub section: Section,
    /// Value interpretation.
    pub kind: ValueKind,
    /// Default value used when the key is absent.
    pub default: &'static str,
    /// Operator-facing description.
    pub description: &'static str,
}

/// A parsed env value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Integer or port value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Text, canonical enum or proxy URL value.
    Text(String),
    /// String list value.
    List(Vec<String>),
    /// Millisecond duration value.
    Millis(u64),
    /// Docker-style duration value.
    Duration(Duration),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds a [`KeySpec`] entry.
const fn key(
    name: &'static str,
    section: Section,
    kind: ValueKind,
    default: &'static str,
    description: &'static str,
) -> KeySpec {
    KeySpec {
        name,
        section,
        kind,
        default,
        description,
    }
}

/// Millisecond kind that must be strictly positive.
const POSITIVE_MS: ValueKind = ValueKind::Millis {
    min: 1,
    max: MAX_MILLIS,
};

/// Millisecond kind that may be zero.
const DELAY_MS: ValueKind = ValueKind::Millis {
    min: 0,
    max: MAX_MILLIS,
};

/// Boolean kind.
const BOOL: ValueKind = ValueKind::Bool;

/// Non-empty text kind.
const TEXT: ValueKind = ValueKind::Text {
    allow_empty: false,
};

/// Every recognized env key, in render order.
pub const KEY_SPECS: &[KeySpec] = &[
    // Ports
    key(
        "PORT",
        Section::Ports,
        ValueKind::Port {
            allow_zero: false,
        },
        "2048",
        "Container port the API server listens on.",
    ),
    key(
        "HOST_PORT",
        Section::Ports,
        ValueKind::Port {
            allow_zero: false,
        },
        "2048",
        "Host port published for PORT.",
    ),
    key(
        "STREAM_PORT",
        Section::Ports,
        ValueKind::Port {
            allow_zero: true,
        },
        "3120",
        "Container port of the streaming helper; 0 disables streaming.",
    ),
    key(
        "HOST_STREAM_PORT",
        Section::Ports,
        ValueKind::Port {
            allow_zero: true,
        },
        "3120",
        "Host port published for STREAM_PORT; must be 0 when streaming is disabled.",
    ),
    key(
        "DEFAULT_CAMOUFOX_PORT",
        Section::Ports,
        ValueKind::Port {
            allow_zero: false,
        },
        "9222",
        "Container-internal remote debugging port of the browser.",
    ),
    // Proxy
    key(
        "UNIFIED_PROXY_CONFIG",
        Section::Proxy,
        ValueKind::ProxyUrl,
        "",
        "Single proxy URL for all traffic; takes precedence over HTTP(S)_PROXY.",
    ),
    key("HTTP_PROXY", Section::Proxy, ValueKind::ProxyUrl, "", "Proxy URL for plain HTTP traffic."),
    key("HTTPS_PROXY", Section::Proxy, ValueKind::ProxyUrl, "", "Proxy URL for HTTPS traffic."),
    key(
        "NO_PROXY",
        Section::Proxy,
        ValueKind::HostList,
        "",
        "Hosts that bypass the proxy, separated by commas or semicolons.",
    ),
    // Logging
    key(
        "SERVER_LOG_LEVEL",
        Section::Logging,
        ValueKind::Enum(LOG_LEVELS),
        "INFO",
        "Minimum level written by the server logger.",
    ),
    key(
        "SERVER_REDIRECT_PRINT",
        Section::Logging,
        BOOL,
        "false",
        "Redirect plain stdout/stderr output into the server log.",
    ),
    key("DEBUG_LOGS_ENABLED", Section::Logging, BOOL, "false", "Emit debug-level log events."),
    key(
        "TRACE_LOGS_ENABLED",
        Section::Logging,
        BOOL,
        "false",
        "Emit trace-level log events; very verbose.",
    ),
    key(
        "LOG_FILE",
        Section::Logging,
        ValueKind::Text {
            allow_empty: true,
        },
        "",
        "Append log events to this file instead of stderr when set.",
    ),
    // Auth
    key(
        "AUTO_SAVE_AUTH",
        Section::Auth,
        BOOL,
        "false",
        "Save the browser authentication state automatically after login.",
    ),
    key(
        "AUTH_SAVE_TIMEOUT",
        Section::Auth,
        ValueKind::Integer {
            min: 1,
            max: 3600,
        },
        "30",
        "Seconds to wait for authentication to be saved.",
    ),
    key(
        "AUTO_CONFIRM_LOGIN",
        Section::Auth,
        BOOL,
        "true",
        "Confirm the login prompt automatically.",
    ),
    // Browser
    key(
        "LAUNCH_MODE",
        Section::Browser,
        ValueKind::Enum(LAUNCH_MODES),
        "headless",
        "Browser launch mode.",
    ),
    // Generation
    key(
        "DEFAULT_TEMPERATURE",
        Section::Generation,
        ValueKind::Float {
            min: 0.0,
            max: 2.0,
        },
        "1.0",
        "Sampling temperature used when a request omits it.",
    ),
    key(
        "DEFAULT_MAX_OUTPUT_TOKENS",
        Section::Generation,
        ValueKind::Integer {
            min: 1,
            max: 1_048_576,
        },
        "65536",
        "Maximum output tokens used when a request omits it.",
    ),
    key(
        "DEFAULT_TOP_P",
        Section::Generation,
        ValueKind::Float {
            min: 0.0,
            max: 1.0,
        },
        "0.95",
        "Nucleus sampling threshold used when a request omits it.",
    ),
    key(
        "DEFAULT_STOP_SEQUENCES",
        Section::Generation,
        ValueKind::JsonStringArray,
        "[]",
        "Stop sequences used when a request omits them, as a JSON array.",
    ),
    key(
        "ENABLE_URL_CONTEXT",
        Section::Generation,
        BOOL,
        "false",
        "Enable the URL context tool for every request.",
    ),
    key(
        "ENABLE_THINKING_BUDGET",
        Section::Generation,
        BOOL,
        "false",
        "Enable the thinking budget when a request does not set reasoning_effort.",
    ),
    key(
        "DEFAULT_THINKING_BUDGET",
        Section::Generation,
        ValueKind::Integer {
            min: 0,
            max: 1_048_576,
        },
        "8192",
        "Thinking token budget applied when the budget is enabled by default.",
    ),
    key(
        "ENABLE_GOOGLE_SEARCH",
        Section::Generation,
        BOOL,
        "false",
        "Enable search grounding when a request does not pass tools.",
    ),
    // Cleanup
    key("UPLOAD_DIR", Section::Cleanup, TEXT, "upload_images", "Directory holding uploaded files."),
    key(
        "UPLOAD_FILE_RETENTION_DAYS",
        Section::Cleanup,
        ValueKind::Integer {
            min: 1,
            max: 3650,
        },
        "7",
        "Uploaded files older than this many days are deleted.",
    ),
    key(
        "FILE_CLEANUP_INTERVAL_HOURS",
        Section::Cleanup,
        ValueKind::Integer {
            min: 1,
            max: 8760,
        },
        "24",
        "Hours between cleanup sweeps.",
    ),
    // Timeouts
    key(
        "RESPONSE_COMPLETION_TIMEOUT",
        Section::Timeouts,
        POSITIVE_MS,
        "300000",
        "Total time allowed for a response to complete.",
    ),
    key(
        "INITIAL_WAIT_MS_BEFORE_POLLING",
        Section::Timeouts,
        DELAY_MS,
        "500",
        "Delay before the first response poll.",
    ),
    key(
        "POLLING_INTERVAL",
        Section::Timeouts,
        POSITIVE_MS,
        "300",
        "Interval between response polls.",
    ),
    key(
        "POLLING_INTERVAL_STREAM",
        Section::Timeouts,
        POSITIVE_MS,
        "180",
        "Interval between response polls while streaming.",
    ),
    key(
        "SILENCE_TIMEOUT_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "60000",
        "Response is considered finished after this long without new output.",
    ),
    key(
        "POST_SPINNER_CHECK_DELAY_MS",
        Section::Timeouts,
        DELAY_MS,
        "500",
        "Delay after the loading spinner disappears before checking state.",
    ),
    key(
        "FINAL_STATE_CHECK_TIMEOUT_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "1500",
        "Timeout for the final completion-state check.",
    ),
    key(
        "POST_COMPLETION_BUFFER",
        Section::Timeouts,
        DELAY_MS,
        "700",
        "Extra wait after completion before reading the response.",
    ),
    key(
        "CLEAR_CHAT_VERIFY_TIMEOUT_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "5000",
        "Timeout for verifying that the chat history was cleared.",
    ),
    key(
        "CLEAR_CHAT_VERIFY_INTERVAL_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "2000",
        "Interval between chat-cleared checks.",
    ),
    key(
        "CLICK_TIMEOUT_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "3000",
        "Timeout for a single click.",
    ),
    key(
        "CLIPBOARD_READ_TIMEOUT_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "3000",
        "Timeout for reading the clipboard.",
    ),
    key(
        "WAIT_FOR_ELEMENT_TIMEOUT_MS",
        Section::Timeouts,
        POSITIVE_MS,
        "10000",
        "Timeout for an element to appear.",
    ),
    key(
        "PSEUDO_STREAM_DELAY",
        Section::Timeouts,
        ValueKind::Float {
            min: 0.0,
            max: 10.0,
        },
        "0.01",
        "Seconds between chunks when replaying a full response as a stream.",
    ),
    // Scripts
    key(
        "ENABLE_SCRIPT_INJECTION",
        Section::Scripts,
        BOOL,
        "true",
        "Inject the userscript into the browser page.",
    ),
    key(
        "USERSCRIPT_PATH",
        Section::Scripts,
        ValueKind::Text {
            allow_empty: true,
        },
        "browser_utils/more_models.js",
        "Path of the injected userscript; required when injection is enabled.",
    ),
    // Model
    key(
        "MODEL_NAME",
        Section::Model,
        TEXT,
        "AI-Studio_Proxy_API",
        "Model name reported by the proxy itself.",
    ),
    key(
        "CHAT_COMPLETION_ID_PREFIX",
        Section::Model,
        TEXT,
        "chatcmpl-",
        "Prefix of generated chat completion ids.",
    ),
    key(
        "DEFAULT_FALLBACK_MODEL_ID",
        Section::Model,
        TEXT,
        "no model list",
        "Model id reported when no model list is available.",
    ),
    key(
        "EXCLUDED_MODELS_FILENAME",
        Section::Model,
        TEXT,
        "excluded_models.txt",
        "File listing model ids to hide, one per line.",
    ),
    // Health
    key(
        "DOCKER_HEALTHCHECK_INTERVAL",
        Section::Health,
        ValueKind::DockerDuration,
        "30s",
        "Time between health checks.",
    ),
    key(
        "DOCKER_HEALTHCHECK_TIMEOUT",
        Section::Health,
        ValueKind::DockerDuration,
        "10s",
        "Time a single health check may take.",
    ),
    key(
        "DOCKER_HEALTHCHECK_RETRIES",
        Section::Health,
        ValueKind::Integer {
            min: 1,
            max: 100,
        },
        "3",
        "Consecutive failures before the container is unhealthy.",
    ),
    key(
        "DOCKER_HEALTHCHECK_START_PERIOD",
        Section::Health,
        ValueKind::DockerDuration,
        "60s",
        "Grace period after start before failures count.",
    ),
];

/// Looks up a key declaration by exact name.
#[must_use]
pub fn find_key(name: &str) -> Option<&'static KeySpec> {
    KEY_SPECS.iter().find(|spec| spec.name == name)
}

/// Returns the keys of `section` in render order.
pub fn keys_in_section(section: Section) -> impl Iterator<Item = &'static KeySpec> {
    KEY_SPECS.iter().filter(move |spec| spec.section == section)
}

// ============================================================================
// SECTION: Value Parsing
// ============================================================================

/// Parses `raw` according to `kind`.
///
/// # Errors
///
/// Returns a human-readable reason when the value does not fit the kind.
pub fn parse_value(kind: ValueKind, raw: &str) -> Result<TypedValue, String> {
    let trimmed = raw.trim();
    match kind {
        ValueKind::Port {
            allow_zero,
        } => {
            let port: u16 =
                trimmed.parse().map_err(|_| format!("expected a port number, got `{raw}`"))?;
            if port == 0 && !allow_zero {
                return Err("port must be between 1 and 65535".to_string());
            }
            Ok(TypedValue::Int(i64::from(port)))
        }
        ValueKind::Integer {
            min,
            max,
        } => {
            let value: i64 =
                trimmed.parse().map_err(|_| format!("expected an integer, got `{raw}`"))?;
            if value < min || value > max {
                return Err(format!("must be between {min} and {max}, got {value}"));
            }
            Ok(TypedValue::Int(value))
        }
        ValueKind::Float {
            min,
            max,
        } => {
            let value: f64 =
                trimmed.parse().map_err(|_| format!("expected a number, got `{raw}`"))?;
            if !value.is_finite() || value < min || value > max {
                return Err(format!("must be between {min} and {max}, got {trimmed}"));
            }
            Ok(TypedValue::Float(value))
        }
        ValueKind::Bool => parse_bool(trimmed)
            .map(TypedValue::Bool)
            .ok_or_else(|| format!("expected true or false, got `{raw}`")),
        ValueKind::Enum(options) => options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(trimmed))
            .map(|option| TypedValue::Text((*option).to_string()))
            .ok_or_else(|| format!("expected one of {}, got `{raw}`", options.join(", "))),
        ValueKind::Millis {
            min,
            max,
        } => {
            let value: u64 = trimmed
                .parse()
                .map_err(|_| format!("expected a whole number of milliseconds, got `{raw}`"))?;
            if value < min || value > max {
                return Err(format!("must be between {min} and {max} ms, got {value}"));
            }
            Ok(TypedValue::Millis(value))
        }
        ValueKind::DockerDuration => parse_docker_duration(trimmed).map(TypedValue::Duration),
        ValueKind::JsonStringArray => {
            if trimmed.is_empty() {
                return Ok(TypedValue::List(Vec::new()));
            }
            serde_json::from_str::<Vec<String>>(trimmed)
                .map(TypedValue::List)
                .map_err(|err| format!("expected a JSON array of strings: {err}"))
        }
        ValueKind::Text {
            allow_empty,
        } => {
            if !allow_empty && trimmed.is_empty() {
                return Err("must be non-empty".to_string());
            }
            Ok(TypedValue::Text(trimmed.to_string()))
        }
        ValueKind::ProxyUrl => parse_proxy_url(trimmed).map(TypedValue::Text),
        ValueKind::HostList => parse_host_list(trimmed).map(TypedValue::List),
    }
}

/// Returns true when `raw` is spelled canonically for `kind`.
///
/// Non-canonical spellings still parse; lint reports them as warnings.
#[must_use]
pub fn is_canonical(kind: ValueKind, raw: &str) -> bool {
    match kind {
        ValueKind::Bool => raw == "true" || raw == "false",
        ValueKind::Enum(options) => options.contains(&raw),
        _ => true,
    }
}

/// Parses a boolean using the accepted spellings, case-insensitively.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    let lowered = raw.trim().to_ascii_lowercase();
    if TRUE_VALUES.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_VALUES.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parses a Docker-style duration made of `<int><unit>` segments.
///
/// # Errors
///
/// Returns a reason when the text is empty, malformed, or overflows.
pub fn parse_docker_duration(raw: &str) -> Result<Duration, String> {
    if raw.is_empty() {
        return Err("expected a duration such as 30s".to_string());
    }
    let mut total = Duration::ZERO;
    let mut rest = raw;
    while !rest.is_empty() {
        let digits_end = rest.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(format!("expected digits in duration `{raw}`"));
        }
        let amount: u64 =
            rest[..digits_end].parse().map_err(|_| format!("duration `{raw}` is too large"))?;
        let after_digits = &rest[digits_end..];
        let unit_end =
            after_digits.find(|ch: char| ch.is_ascii_digit()).unwrap_or(after_digits.len());
        let segment = match &after_digits[..unit_end] {
            "ms" => Some(Duration::from_millis(amount)),
            "s" => Some(Duration::from_secs(amount)),
            "m" => amount.checked_mul(60).map(Duration::from_secs),
            "h" => amount.checked_mul(3600).map(Duration::from_secs),
            "" => return Err(format!("missing unit in duration `{raw}`")),
            unit => return Err(format!("unknown duration unit `{unit}` (use ms, s, m or h)")),
        };
        total = segment
            .and_then(|segment| total.checked_add(segment))
            .ok_or_else(|| format!("duration `{raw}` is too large"))?;
        rest = &after_digits[unit_end..];
    }
    Ok(total)
}

/// Validates an optional proxy URL.
fn parse_proxy_url(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    let url = Url::parse(raw).map_err(|err| format!("invalid proxy URL: {err}"))?;
    if !PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(format!(
            "unsupported proxy scheme `{}` (use {})",
            url.scheme(),
            PROXY_SCHEMES.join(", ")
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("proxy URL must include a host".to_string());
    }
    Ok(raw.to_string())
}

/// Splits and normalizes a host pattern list.
fn parse_host_list(raw: &str) -> Result<Vec<String>, String> {
    let mut hosts = Vec::new();
    for pattern in raw.split([',', ';']) {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        if pattern.chars().any(char::is_whitespace) {
            return Err(format!("host pattern `{pattern}` must not contain whitespace"));
        }
        hosts.push(pattern.to_ascii_lowercase());
    }
    Ok(hosts)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
