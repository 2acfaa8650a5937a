// crates/studio-proxy-config/src/config.rs
// ============================================================================
// Module: Studio Proxy Configuration
// Description: Typed configuration loading and validation for the env file.
// Purpose: Provide strict, fail-closed env parsing with hard limits.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! Configuration is layered from registry defaults, the env file, and the
//! process environment, then parsed per key kind into [`ProxyConfig`].
//! Any invalid registered value fails the load and names the key. Values are
//! read once at startup and never mutated or persisted afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde::Serializer;
use thiserror::Error;
use url::Url;

use crate::dotenv::DotenvError;
use crate::dotenv::parse_env_str;
use crate::dotenv::read_env_text;
use crate::keys::KEY_SPECS;
use crate::keys::TypedValue;
use crate::keys::find_key;
use crate::keys::parse_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default env filename when no path is specified.
pub const DEFAULT_ENV_FILE: &str = ".env";
/// Environment variable used to override the env file path.
pub const ENV_FILE_VAR: &str = "STUDIO_PROXY_ENV_FILE";
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Replacement text for proxy passwords in serialized output.
const REDACTED: &str = "***";
/// Seconds per day.
const SECS_PER_DAY: u64 = 86_400;
/// Seconds per hour.
const SECS_PER_HOUR: u64 = 3_600;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// Env file syntax error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<DotenvError> for ConfigError {
    fn from(error: DotenvError) -> Self {
        match error {
            DotenvError::Io(message) => Self::Io(message),
            DotenvError::Syntax {
                ..
            }
            | DotenvError::DuplicateKey {
                ..
            } => Self::Parse(error.to_string()),
            DotenvError::TooLarge | DotenvError::NotUtf8 => Self::Invalid(error.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Fully resolved proxy service configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyConfig {
    /// Container and host ports.
    pub ports: PortsConfig,
    /// Outbound proxy settings.
    pub proxy: ProxySettings,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Auth state handling.
    pub auth: AuthConfig,
    /// Browser launch configuration.
    pub browser: BrowserConfig,
    /// Default generation parameters.
    pub generation: GenerationConfig,
    /// Upload cleanup configuration.
    pub cleanup: CleanupConfig,
    /// Browser interaction timeouts.
    pub timeouts: TimeoutsConfig,
    /// Userscript injection.
    pub scripts: ScriptsConfig,
    /// Model naming.
    pub model: ModelConfig,
    /// Container health check schedule.
    pub health: HealthConfig,
    /// Env file the configuration was loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Container and host ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortsConfig {
    /// API server container port.
    pub port: u16,
    /// Host port published for the API server.
    pub host_port: u16,
    /// Streaming helper container port; `0` disables streaming.
    pub stream_port: u16,
    /// Host port published for the streaming helper.
    pub host_stream_port: u16,
    /// Browser remote debugging port.
    pub camoufox_port: u16,
}

impl PortsConfig {
    /// Returns true when the streaming helper is enabled.
    #[must_use]
    pub const fn stream_enabled(&self) -> bool {
        self.stream_port != 0
    }
}

/// Outbound proxy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxySettings {
    /// Unified proxy URL for all traffic.
    #[serde(serialize_with = "serialize_redacted_url")]
    pub unified: Option<String>,
    /// HTTP proxy URL.
    #[serde(serialize_with = "serialize_redacted_url")]
    pub http: Option<String>,
    /// HTTPS proxy URL.
    #[serde(serialize_with = "serialize_redacted_url")]
    pub https: Option<String>,
    /// Lowercased host patterns that bypass the proxy.
    pub no_proxy: Vec<String>,
}

impl ProxySettings {
    /// Returns the proxy URL in effect: unified, then HTTPS, then HTTP.
    #[must_use]
    pub fn effective(&self) -> Option<&str> {
        self.unified.as_deref().or(self.https.as_deref()).or(self.http.as_deref())
    }

    /// Returns true when `host` matches a `NO_PROXY` pattern.
    #[must_use]
    pub fn bypasses(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        self.no_proxy.iter().any(|pattern| host_matches(&host, pattern))
    }
}

/// Log level names accepted by `SERVER_LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServerLogLevel {
    /// Debug level.
    Debug,
    /// Info level.
    Info,
    /// Warning level.
    Warning,
    /// Error level.
    Error,
    /// Critical level.
    Critical,
}

impl ServerLogLevel {
    /// Parses a canonical level name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Returns the canonical level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    /// Minimum server log level.
    pub level: ServerLogLevel,
    /// Redirect plain output into the log.
    pub redirect_print: bool,
    /// Debug logging switch.
    pub debug_logs: bool,
    /// Trace logging switch.
    pub trace_logs: bool,
    /// Log file path; stderr when unset.
    pub log_file: Option<PathBuf>,
}

/// Auth state handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthConfig {
    /// Save auth state automatically.
    pub auto_save_auth: bool,
    /// Seconds to wait for auth to be saved.
    pub save_timeout_secs: u32,
    /// Confirm login prompts automatically.
    pub auto_confirm_login: bool,
}

/// Browser launch modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Visible browser window.
    Normal,
    /// Headless browser.
    Headless,
    /// Browser on a virtual display.
    VirtualDisplay,
    /// Attach to an existing debug endpoint without launching.
    DirectDebugNoBrowser,
}

impl LaunchMode {
    /// Parses a canonical launch mode name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Self::Normal),
            "headless" => Some(Self::Headless),
            "virtual_display" => Some(Self::VirtualDisplay),
            "direct_debug_no_browser" => Some(Self::DirectDebugNoBrowser),
            _ => None,
        }
    }

    /// Returns the canonical launch mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Headless => "headless",
            Self::VirtualDisplay => "virtual_display",
            Self::DirectDebugNoBrowser => "direct_debug_no_browser",
        }
    }
}

/// Browser launch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrowserConfig {
    /// Launch mode.
    pub launch_mode: LaunchMode,
}

/// Default generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    /// Default temperature.
    pub temperature: f64,
    /// Default maximum output tokens.
    pub max_output_tokens: u32,
    /// Default nucleus sampling threshold.
    pub top_p: f64,
    /// Default stop sequences.
    pub stop_sequences: Vec<String>,
    /// URL context tool switch.
    pub enable_url_context: bool,
    /// Thinking budget switch used when a request has no reasoning effort.
    pub enable_thinking_budget: bool,
    /// Default thinking budget in tokens.
    pub thinking_budget: u32,
    /// Search grounding switch used when a request has no tools.
    pub enable_google_search: bool,
}

/// Upload cleanup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupConfig {
    /// Directory holding uploaded files.
    pub upload_dir: PathBuf,
    /// Retention period in days.
    pub retention_days: u32,
    /// Sweep interval in hours.
    pub interval_hours: u32,
}

impl CleanupConfig {
    /// Returns the retention period.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_days) * SECS_PER_DAY)
    }

    /// Returns the sweep interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_hours) * SECS_PER_HOUR)
    }
}

/// Browser interaction timeouts in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeoutsConfig {
    /// Total response completion timeout.
    pub response_completion_ms: u64,
    /// Delay before the first poll.
    pub initial_wait_ms: u64,
    /// Poll interval.
    pub polling_interval_ms: u64,
    /// Poll interval while streaming.
    pub polling_interval_stream_ms: u64,
    /// Silence timeout.
    pub silence_timeout_ms: u64,
    /// Delay after the spinner disappears.
    pub post_spinner_check_delay_ms: u64,
    /// Final state check timeout.
    pub final_state_check_timeout_ms: u64,
    /// Buffer after completion.
    pub post_completion_buffer_ms: u64,
    /// Chat-cleared verification timeout.
    pub clear_chat_verify_timeout_ms: u64,
    /// Chat-cleared verification interval.
    pub clear_chat_verify_interval_ms: u64,
    /// Click timeout.
    pub click_timeout_ms: u64,
    /// Clipboard read timeout.
    pub clipboard_read_timeout_ms: u64,
    /// Element wait timeout.
    pub wait_for_element_timeout_ms: u64,
    /// Pseudo-stream chunk delay in seconds.
    pub pseudo_stream_delay_secs: f64,
}

/// Userscript injection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptsConfig {
    /// Injection switch.
    pub enabled: bool,
    /// Userscript path.
    pub userscript_path: PathBuf,
}

/// Model naming configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelConfig {
    /// Model name reported by the proxy.
    pub model_name: String,
    /// Prefix for completion ids.
    pub completion_id_prefix: String,
    /// Model id used when no model list is available.
    pub fallback_model_id: String,
    /// File listing excluded model ids.
    pub excluded_models_file: PathBuf,
}

/// Container health check schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthConfig {
    /// Time between checks.
    #[serde(rename = "interval_ms", serialize_with = "serialize_duration_ms")]
    pub interval: Duration,
    /// Timeout of a single check.
    #[serde(rename = "timeout_ms", serialize_with = "serialize_duration_ms")]
    pub timeout: Duration,
    /// Consecutive failures before unhealthy.
    pub retries: u32,
    /// Grace period after start.
    #[serde(rename = "start_period_ms", serialize_with = "serialize_duration_ms")]
    pub start_period: Duration,
}

/// Soft configuration issue that does not block startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    /// Key the warning is attached to.
    pub key: String,
    /// Operator-facing message.
    pub message: String,
}

impl ConfigWarning {
    /// Builds a warning for `key`.
    fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ProxyConfig {
    /// Loads configuration from the env file and process environment.
    ///
    /// The file is `path`, else `STUDIO_PROXY_ENV_FILE` from `process_env`,
    /// else `.env`. Only a missing default `.env` is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, a
    /// value is invalid, or validation fails.
    pub fn load(
        path: Option<&Path>,
        process_env: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_env_path(path, process_env)?;
        validate_path(&resolved)?;
        let file_exists = resolved.is_file();
        let mut values = if file_exists || explicit {
            let text = read_env_text(&resolved)?;
            parse_env_str(&text)?.to_map()
        } else {
            BTreeMap::new()
        };
        for (key, value) in process_env {
            if find_key(key).is_some() {
                values.insert(key.clone(), value.clone());
            }
        }
        let mut config = Self::from_values(&values)?;
        config.source_path = file_exists.then_some(resolved);
        config.validate()?;
        Ok(config)
    }

    /// Returns the configuration built from registry defaults only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a registry default fails to parse.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_values(&BTreeMap::new())
    }

    /// Builds a configuration from raw key/value pairs.
    ///
    /// Missing keys take registry defaults and unknown keys are ignored.
    /// Cross-field validation is not run; call [`ProxyConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first key whose value
    /// does not parse.
    pub fn from_values(values: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let resolved = ResolvedValues::resolve(values)?;
        Ok(Self {
            ports: PortsConfig {
                port: resolved.int_as("PORT")?,
                host_port: resolved.int_as("HOST_PORT")?,
                stream_port: resolved.int_as("STREAM_PORT")?,
                host_stream_port: resolved.int_as("HOST_STREAM_PORT")?,
                camoufox_port: resolved.int_as("DEFAULT_CAMOUFOX_PORT")?,
            },
            proxy: ProxySettings {
                unified: resolved.optional_text("UNIFIED_PROXY_CONFIG")?,
                http: resolved.optional_text("HTTP_PROXY")?,
                https: resolved.optional_text("HTTPS_PROXY")?,
                no_proxy: resolved.list("NO_PROXY")?,
            },
            logging: LoggingConfig {
                level: resolved.enumerated("SERVER_LOG_LEVEL", ServerLogLevel::from_name)?,
                redirect_print: resolved.flag("SERVER_REDIRECT_PRINT")?,
                debug_logs: resolved.flag("DEBUG_LOGS_ENABLED")?,
                trace_logs: resolved.flag("TRACE_LOGS_ENABLED")?,
                log_file: resolved.optional_text("LOG_FILE")?.map(PathBuf::from),
            },
            auth: AuthConfig {
                auto_save_auth: resolved.flag("AUTO_SAVE_AUTH")?,
                save_timeout_secs: resolved.int_as("AUTH_SAVE_TIMEOUT")?,
                auto_confirm_login: resolved.flag("AUTO_CONFIRM_LOGIN")?,
            },
            browser: BrowserConfig {
                launch_mode: resolved.enumerated("LAUNCH_MODE", LaunchMode::from_name)?,
            },
            generation: GenerationConfig {
                temperature: resolved.float("DEFAULT_TEMPERATURE")?,
                max_output_tokens: resolved.int_as("DEFAULT_MAX_OUTPUT_TOKENS")?,
                top_p: resolved.float("DEFAULT_TOP_P")?,
                stop_sequences: resolved.list("DEFAULT_STOP_SEQUENCES")?,
                enable_url_context: resolved.flag("ENABLE_URL_CONTEXT")?,
                enable_thinking_budget: resolved.flag("ENABLE_THINKING_BUDGET")?,
                thinking_budget: resolved.int_as("DEFAULT_THINKING_BUDGET")?,
                enable_google_search: resolved.flag("ENABLE_GOOGLE_SEARCH")?,
            },
            cleanup: CleanupConfig {
                upload_dir: PathBuf::from(resolved.text("UPLOAD_DIR")?),
                retention_days: resolved.int_as("UPLOAD_FILE_RETENTION_DAYS")?,
                interval_hours: resolved.int_as("FILE_CLEANUP_INTERVAL_HOURS")?,
            },
            timeouts: TimeoutsConfig {
                response_completion_ms: resolved.millis("RESPONSE_COMPLETION_TIMEOUT")?,
                initial_wait_ms: resolved.millis("INITIAL_WAIT_MS_BEFORE_POLLING")?,
                polling_interval_ms: resolved.millis("POLLING_INTERVAL")?,
                polling_interval_stream_ms: resolved.millis("POLLING_INTERVAL_STREAM")?,
                silence_timeout_ms: resolved.millis("SILENCE_TIMEOUT_MS")?,
                post_spinner_check_delay_ms: resolved.millis("POST_SPINNER_CHECK_DELAY_MS")?,
                final_state_check_timeout_ms: resolved.millis("FINAL_STATE_CHECK_TIMEOUT_MS")?,
                post_completion_buffer_ms: resolved.millis("POST_COMPLETION_BUFFER")?,
                clear_chat_verify_timeout_ms: resolved.millis("CLEAR_CHAT_VERIFY_TIMEOUT_MS")?,
                clear_chat_verify_interval_ms: resolved.millis("CLEAR_CHAT_VERIFY_INTERVAL_MS")?,
                click_timeout_ms: resolved.millis("CLICK_TIMEOUT_MS")?,
                clipboard_read_timeout_ms: resolved.millis("CLIPBOARD_READ_TIMEOUT_MS")?,
                wait_for_element_timeout_ms: resolved.millis("WAIT_FOR_ELEMENT_TIMEOUT_MS")?,
                pseudo_stream_delay_secs: resolved.float("PSEUDO_STREAM_DELAY")?,
            },
            scripts: ScriptsConfig {
                enabled: resolved.flag("ENABLE_SCRIPT_INJECTION")?,
                userscript_path: PathBuf::from(resolved.text("USERSCRIPT_PATH")?),
            },
            model: ModelConfig {
                model_name: resolved.text("MODEL_NAME")?,
                completion_id_prefix: resolved.text("CHAT_COMPLETION_ID_PREFIX")?,
                fallback_model_id: resolved.text("DEFAULT_FALLBACK_MODEL_ID")?,
                excluded_models_file: PathBuf::from(resolved.text("EXCLUDED_MODELS_FILENAME")?),
            },
            health: HealthConfig {
                interval: resolved.duration("DOCKER_HEALTHCHECK_INTERVAL")?,
                timeout: resolved.duration("DOCKER_HEALTHCHECK_TIMEOUT")?,
                retries: resolved.int_as("DOCKER_HEALTHCHECK_RETRIES")?,
                start_period: resolved.duration("DOCKER_HEALTHCHECK_START_PERIOD")?,
            },
            source_path: None,
        })
    }

    /// Returns the proxy URL in effect, if any.
    #[must_use]
    pub fn effective_proxy(&self) -> Option<&str> {
        self.proxy.effective()
    }
}

/// Returns the registry defaults as a key/value map.
#[must_use]
pub fn default_values() -> BTreeMap<String, String> {
    KEY_SPECS.iter().map(|spec| (spec.name.to_string(), spec.default.to_string())).collect()
}

// ============================================================================
// SECTION: Validation
// ============================================================================

impl ProxyConfig {
    /// Validates cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ports.validate()?;
        self.timeouts.validate()?;
        self.scripts.validate()?;
        self.model.validate()?;
        self.cleanup.validate()?;
        self.health.validate()?;
        if let Some(log_file) = &self.logging.log_file {
            validate_path_string("LOG_FILE", &log_file.to_string_lossy())?;
        }
        Ok(())
    }

    /// Returns soft issues that do not block startup.
    #[must_use]
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.auth.auto_save_auth && self.browser.launch_mode == LaunchMode::Headless {
            warnings.push(ConfigWarning::new(
                "AUTO_SAVE_AUTH",
                "AUTO_SAVE_AUTH=true has no effect with LAUNCH_MODE=headless; log in with a \
                 visible browser first",
            ));
        }
        if self.logging.trace_logs && !self.logging.debug_logs {
            warnings.push(ConfigWarning::new(
                "TRACE_LOGS_ENABLED",
                "TRACE_LOGS_ENABLED=true without DEBUG_LOGS_ENABLED=true",
            ));
        }
        if self.health.timeout >= self.health.interval {
            warnings.push(ConfigWarning::new(
                "DOCKER_HEALTHCHECK_TIMEOUT",
                "health check timeout is not shorter than the health check interval",
            ));
        }
        if self.timeouts.silence_timeout_ms > self.timeouts.response_completion_ms {
            warnings.push(ConfigWarning::new(
                "SILENCE_TIMEOUT_MS",
                "SILENCE_TIMEOUT_MS exceeds RESPONSE_COMPLETION_TIMEOUT and never fires",
            ));
        }
        if self.proxy.unified.is_some() && (self.proxy.http.is_some() || self.proxy.https.is_some())
        {
            warnings.push(ConfigWarning::new(
                "UNIFIED_PROXY_CONFIG",
                "UNIFIED_PROXY_CONFIG overrides HTTP_PROXY and HTTPS_PROXY",
            ));
        }
        warnings
    }
}

impl PortsConfig {
    /// Validates port uniqueness and the stream port pairing.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.stream_enabled() != (self.host_stream_port != 0) {
            return Err(ConfigError::Invalid(
                "HOST_STREAM_PORT must be 0 exactly when STREAM_PORT is 0".to_string(),
            ));
        }
        let mut container =
            vec![("PORT", self.port), ("DEFAULT_CAMOUFOX_PORT", self.camoufox_port)];
        let mut host = vec![("HOST_PORT", self.host_port)];
        if self.stream_enabled() {
            container.push(("STREAM_PORT", self.stream_port));
            host.push(("HOST_STREAM_PORT", self.host_stream_port));
        }
        ensure_distinct_ports(&container)?;
        ensure_distinct_ports(&host)
    }
}

impl TimeoutsConfig {
    /// Validates polling and verification interval ordering.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.polling_interval_ms >= self.response_completion_ms {
            return Err(ConfigError::Invalid(
                "POLLING_INTERVAL must be less than RESPONSE_COMPLETION_TIMEOUT".to_string(),
            ));
        }
        if self.polling_interval_stream_ms >= self.response_completion_ms {
            return Err(ConfigError::Invalid(
                "POLLING_INTERVAL_STREAM must be less than RESPONSE_COMPLETION_TIMEOUT".to_string(),
            ));
        }
        if self.clear_chat_verify_interval_ms > self.clear_chat_verify_timeout_ms {
            return Err(ConfigError::Invalid(
                "CLEAR_CHAT_VERIFY_INTERVAL_MS must not exceed CLEAR_CHAT_VERIFY_TIMEOUT_MS"
                    .to_string(),
            ));
        }
        if !self.pseudo_stream_delay_secs.is_finite() || self.pseudo_stream_delay_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "PSEUDO_STREAM_DELAY must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

impl ScriptsConfig {
    /// Validates the userscript path when injection is enabled.
    fn validate(&self) -> Result<(), ConfigError> {
        let path = self.userscript_path.to_string_lossy();
        if self.enabled || !path.trim().is_empty() {
            validate_path_string("USERSCRIPT_PATH", &path)?;
        }
        Ok(())
    }
}

impl ModelConfig {
    /// Validates required model strings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::Invalid("MODEL_NAME must be non-empty".to_string()));
        }
        if self.completion_id_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "CHAT_COMPLETION_ID_PREFIX must be non-empty".to_string(),
            ));
        }
        validate_path_string(
            "EXCLUDED_MODELS_FILENAME",
            &self.excluded_models_file.to_string_lossy(),
        )
    }
}

impl CleanupConfig {
    /// Validates the upload directory and schedule.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("UPLOAD_DIR", &self.upload_dir.to_string_lossy())?;
        if self.retention_days == 0 {
            return Err(ConfigError::Invalid(
                "UPLOAD_FILE_RETENTION_DAYS must be greater than zero".to_string(),
            ));
        }
        if self.interval_hours == 0 {
            return Err(ConfigError::Invalid(
                "FILE_CLEANUP_INTERVAL_HOURS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl HealthConfig {
    /// Validates non-zero health check timing.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "DOCKER_HEALTHCHECK_INTERVAL must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "DOCKER_HEALTHCHECK_TIMEOUT must be greater than zero".to_string(),
            ));
        }
        if self.retries == 0 {
            return Err(ConfigError::Invalid(
                "DOCKER_HEALTHCHECK_RETRIES must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Resolved Values
// ============================================================================

/// Parsed registry values keyed by name.
struct ResolvedValues {
    /// Typed value per registered key.
    values: BTreeMap<&'static str, TypedValue>,
}

impl ResolvedValues {
    /// Parses every registered key from `raw`, falling back to defaults.
    fn resolve(raw: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for spec in KEY_SPECS {
            let text = raw.get(spec.name).map_or(spec.default, String::as_str);
            let typed = parse_value(spec.kind, text)
                .map_err(|reason| ConfigError::Invalid(format!("{}: {reason}", spec.name)))?;
            values.insert(spec.name, typed);
        }
        Ok(Self {
            values,
        })
    }

    /// Returns the typed value for `name`.
    fn get(&self, name: &str) -> Result<&TypedValue, ConfigError> {
        self.values
            .get(name)
            .ok_or_else(|| ConfigError::Invalid(format!("{name}: key is not registered")))
    }

    /// Returns an integer value converted to `T`.
    fn int_as<T: TryFrom<i64>>(&self, name: &str) -> Result<T, ConfigError> {
        match self.get(name)? {
            TypedValue::Int(value) => T::try_from(*value)
                .map_err(|_| ConfigError::Invalid(format!("{name}: value out of range"))),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns a float value.
    fn float(&self, name: &str) -> Result<f64, ConfigError> {
        match self.get(name)? {
            TypedValue::Float(value) => Ok(*value),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns a boolean value.
    fn flag(&self, name: &str) -> Result<bool, ConfigError> {
        match self.get(name)? {
            TypedValue::Bool(value) => Ok(*value),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns a text value.
    fn text(&self, name: &str) -> Result<String, ConfigError> {
        match self.get(name)? {
            TypedValue::Text(value) => Ok(value.clone()),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns a text value, mapping empty text to `None`.
    fn optional_text(&self, name: &str) -> Result<Option<String>, ConfigError> {
        let value = self.text(name)?;
        Ok((!value.is_empty()).then_some(value))
    }

    /// Returns a list value.
    fn list(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        match self.get(name)? {
            TypedValue::List(value) => Ok(value.clone()),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns a millisecond value.
    fn millis(&self, name: &str) -> Result<u64, ConfigError> {
        match self.get(name)? {
            TypedValue::Millis(value) => Ok(*value),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns a duration value.
    fn duration(&self, name: &str) -> Result<Duration, ConfigError> {
        match self.get(name)? {
            TypedValue::Duration(value) => Ok(*value),
            _ => Err(kind_mismatch(name)),
        }
    }

    /// Returns an enum value mapped through `from_name`.
    fn enumerated<T>(
        &self,
        name: &str,
        from_name: fn(&str) -> Option<T>,
    ) -> Result<T, ConfigError> {
        let text = self.text(name)?;
        from_name(&text)
            .ok_or_else(|| ConfigError::Invalid(format!("{name}: unknown value {text}")))
    }
}

/// Builds the error for a registry kind that disagrees with the accessor.
fn kind_mismatch(name: &str) -> ConfigError {
    ConfigError::Invalid(format!("{name}: unexpected value kind"))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the env file path and whether it was requested explicitly.
///
/// Order: `path`, then `STUDIO_PROXY_ENV_FILE`, then `.env`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the override path is too long.
pub fn resolve_env_path(
    path: Option<&Path>,
    process_env: &BTreeMap<String, String>,
) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = process_env.get(ENV_FILE_VAR)
        && !env_path.trim().is_empty()
    {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("env file path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_ENV_FILE), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("env file path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("env file path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Rejects duplicate ports among the named entries.
fn ensure_distinct_ports(ports: &[(&str, u16)]) -> Result<(), ConfigError> {
    for (index, (name, port)) in ports.iter().enumerate() {
        if let Some((other, _)) = ports[index + 1..].iter().find(|(_, candidate)| candidate == port)
        {
            return Err(ConfigError::Invalid(format!("{name} and {other} both use port {port}")));
        }
    }
    Ok(())
}

/// Returns true when a lowercased host matches a `NO_PROXY` pattern.
fn host_matches(host: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let domain =
        pattern.strip_prefix("*.").or_else(|| pattern.strip_prefix('.')).unwrap_or(pattern);
    if domain.is_empty() {
        return false;
    }
    host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}

/// Returns `raw` with any URL password replaced by a placeholder.
#[must_use]
pub fn redact_proxy_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some(REDACTED)).is_err() {
                return REDACTED.to_string();
            }
            url.to_string()
        }
        Ok(_) => raw.to_string(),
        Err(_) => REDACTED.to_string(),
    }
}

/// Serializes an optional proxy URL with its password redacted.
fn serialize_redacted_url<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(raw) => serializer.serialize_some(&redact_proxy_url(raw)),
        None => serializer.serialize_none(),
    }
}

/// Serializes a duration as whole milliseconds.
fn serialize_duration_ms<S: Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
