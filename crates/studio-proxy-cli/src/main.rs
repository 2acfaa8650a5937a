// crates/studio-proxy-cli/src/main.rs
// ============================================================================
// Module: Studio Proxy CLI Entry Point
// Description: Command dispatcher for env config, cleanup, params, and health.
// Purpose: Provide a localized CLI over the studio proxy configuration.
// Dependencies: clap, serde, serde_jcs, studio-proxy-config, studio-proxy-core,
//               thiserror, tokio
// ============================================================================

//! ## Overview
//! The `studio-proxy` CLI loads the `.env` configuration the same way the
//! proxy does and exposes it for inspection: validation, lint, canonical
//! JSON, generated template, docs, and schema. It also drives the upload
//! cleanup service, resolves generation parameters for a sample request, and
//! runs the container health probe. All user-facing strings are routed
//! through the i18n catalog. Errors bubble up to [`main`], which maps them to
//! an exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use serde::de::DeserializeOwned;
use studio_proxy_cli::t;
use studio_proxy_config::DOCS_PATH;
use studio_proxy_config::LintFinding;
use studio_proxy_config::LintReport;
use studio_proxy_config::ProxyConfig;
use studio_proxy_config::TEMPLATE_PATH;
use studio_proxy_config::config_docs_markdown;
use studio_proxy_config::config_schema;
use studio_proxy_config::env_template;
use studio_proxy_config::lint_env_file;
use studio_proxy_config::resolve_env_path;
use studio_proxy_config::verify_config_docs;
use studio_proxy_config::verify_env_template;
use studio_proxy_config::write_config_docs;
use studio_proxy_config::write_env_template;
use studio_proxy_core::CleanupService;
use studio_proxy_core::GenerationRequest;
use studio_proxy_core::HealthProbe;
use studio_proxy_core::Logger;
use studio_proxy_core::ModelCatalog;
use studio_proxy_core::ParamsCache;
use studio_proxy_core::ResolvedParams;
use studio_proxy_core::completion_id;
use studio_proxy_core::models::ModelEntry;
use studio_proxy_core::models::load_excluded_models;
use studio_proxy_core::params::ParamField;
use studio_proxy_core::resolve_params;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a request or model list input file.
const MAX_INPUT_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "studio-proxy", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Env file path (overrides `STUDIO_PROXY_ENV_FILE`; defaults to `.env`).
    #[arg(long = "env-file", value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Env configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Upload cleanup utilities.
    Cleanup {
        /// Selected cleanup subcommand.
        #[command(subcommand)]
        command: CleanupCommand,
    },
    /// Generation parameter utilities.
    Params {
        /// Selected params subcommand.
        #[command(subcommand)]
        command: ParamsCommand,
    },
    /// Probe the proxy health endpoint.
    Health(HealthCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the env config.
    Validate,
    /// Lint the env file.
    Lint(ConfigLintCommand),
    /// Print the effective config as canonical JSON.
    Show,
    /// Render or verify the `.env.example` template.
    Template(GeneratedFileCommand),
    /// Render or verify the markdown key reference.
    Docs(GeneratedFileCommand),
    /// Print the JSON schema of the env file.
    Schema,
}

/// Cleanup subcommands.
#[derive(Subcommand, Debug)]
enum CleanupCommand {
    /// Run one sweep and print the report.
    Run,
    /// Print the cleanup settings.
    Status,
    /// Run the periodic cleanup loop until interrupted.
    Serve,
}

/// Params subcommands.
#[derive(Subcommand, Debug)]
enum ParamsCommand {
    /// Resolve parameters for a request JSON file.
    Resolve(ParamsResolveCommand),
}

/// Output formats for structured CLI commands.
#[derive(ValueEnum, Copy, Clone, Debug, Default)]
enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Canonical JSON output.
    Json,
}

/// Arguments for `config lint`.
#[derive(Args, Debug)]
struct ConfigLintCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for generated file commands.
#[derive(Args, Debug)]
struct GeneratedFileCommand {
    /// Write to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Verify the file on disk matches instead of writing.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
}

/// Arguments for `params resolve`.
#[derive(Args, Debug)]
struct ParamsResolveCommand {
    /// Chat request JSON file.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Model list JSON file.
    #[arg(long, value_name = "PATH")]
    models: Option<PathBuf>,
    /// Model id overriding the request's `model`.
    #[arg(long, value_name = "ID")]
    model: Option<String>,
}

/// Arguments for `health`.
#[derive(Args, Debug)]
struct HealthCommand {
    /// Health endpoint URL (defaults to `http://127.0.0.1:{PORT}/health`).
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// Retry with the configured interval until healthy.
    #[arg(long, action = ArgAction::SetTrue)]
    wait: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let env_file = cli.env_file.as_deref();
    match command {
        Commands::Config {
            command,
        } => command_config(command, env_file),
        Commands::Cleanup {
            command,
        } => command_cleanup(command, env_file).await,
        Commands::Params {
            command,
        } => command_params(command, env_file),
        Commands::Health(command) => command_health(&command, env_file).await,
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_bytes(help.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand, env_file: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(env_file),
        ConfigCommand::Lint(command) => command_config_lint(&command, env_file),
        ConfigCommand::Show => command_config_show(env_file),
        ConfigCommand::Template(command) => command_config_template(&command),
        ConfigCommand::Docs(command) => command_config_docs(&command),
        ConfigCommand::Schema => {
            write_canonical_json(&config_schema())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes `config validate`.
fn command_config_validate(env_file: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(env_file)?;
    for warning in config.warnings() {
        write_stderr_line(&t!("config.warning", key = warning.key, message = warning.message))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    let source = config.source_path.as_ref().map_or_else(
        || t!("config.validate.source.defaults"),
        |path| path.display().to_string(),
    );
    write_stdout_line(&t!("config.validate.ok", source = source))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config lint`.
fn command_config_lint(
    command: &ConfigLintCommand,
    env_file: Option<&Path>,
) -> CliResult<ExitCode> {
    let env = process_env();
    let (path, _) = resolve_env_path(env_file, &env)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let report = lint_env_file(&path).map_err(|err| {
        CliError::new(t!("config.lint.read_failed", path = path.display(), error = err))
    })?;
    match command.format {
        OutputFormat::Text => {
            let text = render_lint_text(&path, &report);
            write_stdout_bytes(text.as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        OutputFormat::Json => {
            write_canonical_json(&LintOutput {
                path: path.display().to_string(),
                errors: report.error_count(),
                warnings: report.warning_count(),
                findings: &report.findings,
            })?;
        }
    }
    if report.has_errors() {
        return Err(CliError::new(t!(
            "config.lint.failed",
            path = path.display(),
            errors = report.error_count()
        )));
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `config show`.
fn command_config_show(env_file: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(env_file)?;
    write_canonical_json(&config)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config template`.
fn command_config_template(command: &GeneratedFileCommand) -> CliResult<ExitCode> {
    let path = command.output.as_deref();
    let shown = path.unwrap_or_else(|| Path::new(TEMPLATE_PATH)).display().to_string();
    if command.check {
        verify_env_template(path)
            .map_err(|err| CliError::new(t!("config.template.check_failed", error = err)))?;
        write_stdout_line(&t!("config.template.up_to_date", path = shown))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else if path.is_some() {
        write_env_template(path)
            .map_err(|err| CliError::new(t!("config.template.write_failed", error = err)))?;
        write_stdout_line(&t!("config.template.written", path = shown))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        write_stdout_bytes(env_template().as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `config docs`.
fn command_config_docs(command: &GeneratedFileCommand) -> CliResult<ExitCode> {
    let path = command.output.as_deref();
    let shown = path.unwrap_or_else(|| Path::new(DOCS_PATH)).display().to_string();
    if command.check {
        verify_config_docs(path)
            .map_err(|err| CliError::new(t!("config.docs.check_failed", error = err)))?;
        write_stdout_line(&t!("config.docs.up_to_date", path = shown))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else if path.is_some() {
        write_config_docs(path)
            .map_err(|err| CliError::new(t!("config.docs.write_failed", error = err)))?;
        write_stdout_line(&t!("config.docs.written", path = shown))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        let markdown = config_docs_markdown();
        write_stdout_bytes(markdown.as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// JSON output for `config lint --format json`.
#[derive(Serialize)]
struct LintOutput<'a> {
    /// Linted file.
    path: String,
    /// Number of error findings.
    errors: usize,
    /// Number of warning findings.
    warnings: usize,
    /// Findings in line order.
    findings: &'a [LintFinding],
}

/// Renders lint findings followed by a summary line.
fn render_lint_text(path: &Path, report: &LintReport) -> String {
    let mut output = String::new();
    for finding in &report.findings {
        output.push_str(&finding.to_string());
        output.push('\n');
    }
    if report.is_clean() {
        output.push_str(&t!("config.lint.clean", path = path.display()));
    } else {
        output.push_str(&t!(
            "config.lint.summary",
            path = path.display(),
            errors = report.error_count(),
            warnings = report.warning_count()
        ));
    }
    output.push('\n');
    output
}

// ============================================================================
// SECTION: Cleanup Commands
// ============================================================================

/// Dispatches cleanup subcommands.
async fn command_cleanup(command: CleanupCommand, env_file: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(env_file)?;
    let logger = component_logger(&config, "cleanup")?;
    let service = CleanupService::new(config.cleanup.clone(), logger);
    match command {
        CleanupCommand::Run => {
            let report = tokio::task::spawn_blocking(move || service.sweep(SystemTime::now()))
                .await
                .map_err(|err| CliError::new(t!("cleanup.run_failed", error = err)))?;
            write_canonical_json(&report)?;
        }
        CleanupCommand::Status => write_canonical_json(&service.status())?,
        CleanupCommand::Serve => {
            service
                .start()
                .map_err(|err| CliError::new(t!("cleanup.start_failed", error = err)))?;
            write_stderr_line(&t!(
                "cleanup.serve.started",
                path = config.cleanup.upload_dir.display()
            ))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            let signal = tokio::signal::ctrl_c().await;
            service.stop().await;
            signal.map_err(|err| CliError::new(t!("cleanup.serve.signal_failed", error = err)))?;
            write_stderr_line(&t!("cleanup.serve.stopped"))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Params Commands
// ============================================================================

/// JSON output for `params resolve`.
#[derive(Serialize)]
struct ParamsResolveOutput {
    /// Model the request resolves to.
    model: String,
    /// Output token ceiling of the resolved model.
    model_max_output_tokens: u32,
    /// Completion id the proxy would assign.
    completion_id: String,
    /// Resolved parameters.
    params: ResolvedParams,
    /// Fields a fresh page would need applied, in order.
    apply: Vec<ParamField>,
}

/// Dispatches params subcommands.
fn command_params(command: ParamsCommand, env_file: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ParamsCommand::Resolve(command) => command_params_resolve(&command, env_file),
    }
}

/// Executes `params resolve`.
fn command_params_resolve(
    command: &ParamsResolveCommand,
    env_file: Option<&Path>,
) -> CliResult<ExitCode> {
    let config = load_config(env_file)?;
    let request: GenerationRequest = read_json_input(&command.input, &t!("input.kind.request"))?;
    let entries: Vec<ModelEntry> = match &command.models {
        Some(path) => read_json_input(path, &t!("input.kind.models"))?,
        None => Vec::new(),
    };
    let excluded = load_excluded_models(&config.model.excluded_models_file)
        .map_err(|err| CliError::new(t!("params.models.load_failed", error = err)))?;
    let catalog = ModelCatalog::new(entries, excluded);

    let requested = command.model.as_deref().or(request.model.as_deref());
    let model = catalog.resolve(requested, &config.model);
    let model_max_output_tokens = catalog.max_output_tokens(&model);
    let params = resolve_params(&request, &config.generation, model_max_output_tokens);
    let apply = ParamsCache::new().plan(&params).fields();

    write_canonical_json(&ParamsResolveOutput {
        model,
        model_max_output_tokens,
        completion_id: completion_id(&config.model.completion_id_prefix, SystemTime::now()),
        params,
        apply,
    })?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Health Command
// ============================================================================

/// Executes `health`.
async fn command_health(command: &HealthCommand, env_file: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(env_file)?;
    let probe = HealthProbe::from_config(&config, command.url.as_deref())
        .map_err(|err| CliError::new(t!("health.client_failed", error = err)))?;
    let result =
        if command.wait { probe.wait_until_healthy().await } else { probe.check_once().await };
    let report =
        result.map_err(|err| CliError::new(t!("health.failed", url = probe.url(), error = err)))?;
    write_canonical_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Returns the process environment, skipping non-UTF-8 entries.
fn process_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Loads and validates the env config.
fn load_config(env_file: Option<&Path>) -> CliResult<ProxyConfig> {
    ProxyConfig::load(env_file, &process_env())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Builds a logger for `component` from the logging settings.
fn component_logger(config: &ProxyConfig, component: &str) -> CliResult<Logger> {
    Logger::from_config(&config.logging, component).map_err(|err| {
        let path = config
            .logging
            .log_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        CliError::new(t!("logging.open_failed", path = path, error = err))
    })
}

/// Reads and parses a JSON input file with a size limit.
fn read_json_input<T: DeserializeOwned>(path: &Path, kind: &str) -> CliResult<T> {
    let bytes = read_input_with_limit(path, kind, MAX_INPUT_BYTES)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })
}

/// Reads a file, refusing anything larger than `limit` bytes.
fn read_input_with_limit(path: &Path, kind: &str, limit: u64) -> CliResult<Vec<u8>> {
    let read_failed = |err: std::io::Error| {
        CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
    };
    let size = fs::metadata(path).map_err(read_failed)?.len();
    if size > limit {
        return Err(CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )));
    }
    fs::read(path).map_err(read_failed)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value as canonical JSON to stdout.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
