// crates/sentinel-cli/src/main.rs
// ============================================================================
// Crate: sentinel-cli
// Description: Command-line entry point wiring the engine/broker/store crates to spec operations.
// Purpose: Let operators and adapters drive Sentinel without embedding it as a library.
// Dependencies: sentinel-core, sentinel-config, sentinel-rules, sentinel-engine, sentinel-broker,
//   sentinel-providers, sentinel-store-sqlite, clap, tokio
// ============================================================================

//! # sentinel-cli
//!
//! One subcommand per public operation named in spec §6: `process-metrics`,
//! `process-events`, and `generate-alert` feed the Alert Generator (C4);
//! `acknowledge`/`resolve`/`suppress` drive an [`sentinel_core::Alert`]'s own
//! transition methods; `select-resolution` drives the Resolution Selector
//! (C9); `approve`/`reject` drive the Approval Manager (C8); `serve` runs
//! the Escalation Manager's (C5) background worker until interrupted; and
//! `config init`/`config schema`/`config validate` expose `sentinel-config`'s
//! canonical example and schema. [`composition`] is the single place a
//! loaded [`sentinel_config::SentinelConfig`] becomes a wired [`composition::Runtime`];
//! [`dto`] defines the JSON input shapes this binary accepts.

mod composition;
mod dto;

use std::io::Read as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use sentinel_config::SentinelConfig;
use sentinel_core::Alert;
use sentinel_core::AlertId;
use sentinel_core::AlertTransitionError;
use sentinel_core::ApprovalTransitionError;
use sentinel_core::Context;
use sentinel_core::ExecutionId;
use sentinel_core::IssueId;
use sentinel_core::RequestId;
use sentinel_core::Resolution;
use sentinel_core::RuleId;
use sentinel_engine::ApprovalContext;
use sentinel_engine::SelectionOutcome;
use sentinel_engine::SelectionThresholds;
use sentinel_rules::Event;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

/// Upper bound on a JSON input body read from a file or stdin.
const MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Surface
// ============================================================================

/// Sentinel: alerting and self-healing decision core for data pipelines.
#[derive(Parser, Debug)]
#[command(
    name = "sentinel",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands, one per spec §6 operation.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluates THRESHOLD/TREND/ANOMALY/COMPOUND rules against a metrics snapshot.
    ProcessMetrics(ProcessMetricsCommand),
    /// Evaluates EVENT/PATTERN rules against a batch of events.
    ProcessEvents(ProcessEventsCommand),
    /// Creates an alert directly, bypassing rule evaluation.
    GenerateAlert(GenerateAlertCommand),
    /// Acknowledges an alert.
    Acknowledge(AlertActionCommand),
    /// Resolves an alert.
    Resolve(AlertActionCommand),
    /// Suppresses an alert.
    Suppress(SuppressCommand),
    /// Scores candidate healing actions and selects (and, if permitted, dispatches) the best one.
    SelectResolution(SelectResolutionCommand),
    /// Approves a pending approval request.
    Approve(ApprovalDecisionCommand),
    /// Rejects a pending approval request.
    Reject(RejectCommand),
    /// Runs the escalation background worker until interrupted.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration file location plus the `SQLite` database backing a command.
#[derive(Args, Debug)]
struct StoreArgs {
    /// Path to the `sentinel.toml` configuration file; defaults to
    /// `sentinel.toml` in the current directory, or the path named by
    /// `SENTINEL_CONFIG`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Path to the `SQLite` database file; defaults to `sentinel.db` in the
    /// current directory.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

/// A JSON input body for a command, read from a file or stdin.
#[derive(Args, Debug)]
struct InputArgs {
    /// Path to a JSON input file; reads from stdin when omitted.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

/// Arguments for `process-metrics`.
#[derive(Args, Debug)]
struct ProcessMetricsCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// The `ProcessMetricsInput` JSON body.
    #[command(flatten)]
    input: InputArgs,
}

/// Arguments for `process-events`.
#[derive(Args, Debug)]
struct ProcessEventsCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// The `ProcessEventsInput` JSON body.
    #[command(flatten)]
    input: InputArgs,
}

/// Alert severities accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum SeverityArg {
    /// Informational only.
    Info,
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

impl From<SeverityArg> for sentinel_core::Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Info => Self::Info,
            SeverityArg::Low => Self::Low,
            SeverityArg::Medium => Self::Medium,
            SeverityArg::High => Self::High,
            SeverityArg::Critical => Self::Critical,
        }
    }
}

/// Arguments for `generate-alert`.
#[derive(Args, Debug)]
struct GenerateAlertCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// Alert type tag.
    #[arg(long)]
    alert_type: String,
    /// Human-readable description.
    #[arg(long)]
    description: String,
    /// Alert severity.
    #[arg(long, value_enum)]
    severity: SeverityArg,
    /// Context merged into the alert, as a JSON object.
    #[arg(long, value_name = "JSON")]
    context: Option<String>,
    /// Pipeline component raising this alert, if any.
    #[arg(long)]
    component: Option<String>,
    /// Pipeline execution this alert pertains to, if any.
    #[arg(long)]
    execution_id: Option<String>,
    /// Adapter or subsystem reporting this alert.
    #[arg(long)]
    source: String,
}

/// Arguments shared by `acknowledge` and `resolve`.
#[derive(Args, Debug)]
struct AlertActionCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// Alert identifier.
    #[arg(long)]
    alert_id: String,
    /// Who performed this action.
    #[arg(long)]
    actor: String,
    /// Free-form notes.
    #[arg(long)]
    notes: Option<String>,
}

/// Arguments for `suppress`.
#[derive(Args, Debug)]
struct SuppressCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// Alert identifier.
    #[arg(long)]
    alert_id: String,
    /// Why this alert is being suppressed.
    #[arg(long)]
    reason: String,
}

/// Arguments for `select-resolution`.
#[derive(Args, Debug)]
struct SelectResolutionCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// The `SelectResolutionInput` JSON body.
    #[command(flatten)]
    input: InputArgs,
}

/// Arguments for `approve`.
#[derive(Args, Debug)]
struct ApprovalDecisionCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// Approval request identifier.
    #[arg(long)]
    request_id: String,
    /// Who is deciding this request.
    #[arg(long)]
    approver: String,
}

/// Arguments for `reject`.
#[derive(Args, Debug)]
struct RejectCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
    /// Approval request identifier.
    #[arg(long)]
    request_id: String,
    /// Who is deciding this request.
    #[arg(long)]
    approver: String,
    /// Why the request is being rejected.
    #[arg(long)]
    reason: String,
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Configuration and database location.
    #[command(flatten)]
    store: StoreArgs,
}

/// Configuration utility subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Prints a canonical example `sentinel.toml`.
    Init,
    /// Prints the JSON schema for `sentinel.toml`.
    Schema,
    /// Loads and validates a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Path to the configuration file to validate.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Generates `impl From<$source> for CliError` via `$source`'s `Display`.
macro_rules! impl_cli_error_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(error: $source) -> Self {
                    Self::new(error.to_string())
                }
            }
        )+
    };
}

impl_cli_error_from!(
    sentinel_config::ConfigError,
    composition::BuildError,
    sentinel_core::RepositoryError,
    sentinel_engine::GeneratorError,
    AlertTransitionError,
    ApprovalTransitionError,
    serde_json::Error,
);

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        write_stdout_line(&format!("sentinel {}", env!("CARGO_PKG_VERSION")))
            .map_err(io_error("stdout"))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        write_stderr_line("no command given; run with --help for usage")
            .map_err(io_error("stderr"))?;
        return Ok(ExitCode::FAILURE);
    };

    match command {
        Commands::ProcessMetrics(command) => command_process_metrics(command).await,
        Commands::ProcessEvents(command) => command_process_events(command).await,
        Commands::GenerateAlert(command) => command_generate_alert(command).await,
        Commands::Acknowledge(command) => command_acknowledge(command).await,
        Commands::Resolve(command) => command_resolve(command).await,
        Commands::Suppress(command) => command_suppress(command).await,
        Commands::SelectResolution(command) => command_select_resolution(command).await,
        Commands::Approve(command) => command_approve(command).await,
        Commands::Reject(command) => command_reject(command).await,
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config { command } => command_config(command).await,
    }
}

// ============================================================================
// SECTION: Command Handlers
// ============================================================================

/// Loads the configuration and opens the store named by `store`, then wires
/// every component into a [`composition::Runtime`].
fn open_runtime(store: &StoreArgs) -> CliResult<composition::Runtime> {
    let config = SentinelConfig::load(store.config.as_deref())?;
    let db = composition::open_store(store.db.clone())?;
    Ok(composition::build(config, &db)?)
}

/// Runs `process-metrics`.
async fn command_process_metrics(command: ProcessMetricsCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let input: dto::ProcessMetricsInput = parse_input(command.input.input.as_ref())?;
    let execution_id = input.execution_id.map(ExecutionId::new);
    let only: Option<Vec<RuleId>> =
        input.only.map(|ids| ids.iter().map(|id| RuleId::from(id.as_str())).collect());

    let alerts = runtime
        .generator
        .process_metrics(
            &input.metrics,
            &input.context,
            &input.historical_series,
            input.component.as_deref(),
            execution_id.as_ref(),
            only.as_deref(),
        )
        .await?;
    write_json_line(&alerts)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `process-events`, evaluating every event independently and
/// concatenating the admitted alerts in order (spec §6:
/// `process_events(events, context) -> [alert_id]`).
async fn command_process_events(command: ProcessEventsCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let input: dto::ProcessEventsInput = parse_input(command.input.input.as_ref())?;
    let execution_id = input.execution_id.map(ExecutionId::new);
    let only: Option<Vec<RuleId>> =
        input.only.map(|ids| ids.iter().map(|id| RuleId::from(id.as_str())).collect());

    let mut admitted = Vec::new();
    for event_dto in input.events {
        let event = Event {
            event_type: event_dto.event_type,
            event_source: event_dto.event_source,
            properties: event_dto.properties,
        };
        let alerts = runtime
            .generator
            .process_event(
                &event,
                &input.context,
                input.component.as_deref(),
                execution_id.as_ref(),
                only.as_deref(),
            )
            .await?;
        admitted.extend(alerts);
    }
    write_json_line(&admitted)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `generate-alert`.
async fn command_generate_alert(command: GenerateAlertCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let context: Context = match command.context {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|err| CliError::new(format!("invalid --context JSON: {err}")))?,
        None => Context::new(),
    };

    let alert = runtime
        .generator
        .generate_alert(
            command.alert_type,
            command.description,
            command.severity.into(),
            context,
            command.component,
            command.execution_id.map(ExecutionId::new),
            command.source,
        )
        .await?;
    write_json_line(&alert)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs an [`Alert`] transition (`acknowledge`/`resolve`) and persists it.
async fn run_alert_transition(
    command: AlertActionCommand,
    transition: impl FnOnce(
        &mut Alert,
        String,
        Option<String>,
        OffsetDateTime,
    ) -> Result<(), AlertTransitionError>,
) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let mut alert = runtime.alert_repository.get(&AlertId::new(command.alert_id)).await?;
    let now = runtime.clock.now();
    transition(&mut alert, command.actor, command.notes, now)?;
    let updated = runtime.alert_repository.update(alert).await?;
    write_json_line(&updated)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `acknowledge`.
async fn command_acknowledge(command: AlertActionCommand) -> CliResult<ExitCode> {
    run_alert_transition(command, |alert, actor, notes, now| alert.acknowledge(actor, notes, now))
        .await
}

/// Runs `resolve`.
async fn command_resolve(command: AlertActionCommand) -> CliResult<ExitCode> {
    run_alert_transition(command, |alert, actor, notes, now| alert.resolve(actor, notes, now)).await
}

/// Runs `suppress`.
async fn command_suppress(command: SuppressCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let mut alert = runtime.alert_repository.get(&AlertId::new(command.alert_id)).await?;
    let now = runtime.clock.now();
    alert.suppress(command.reason, now)?;
    let updated = runtime.alert_repository.update(alert).await?;
    write_json_line(&updated)?;
    Ok(ExitCode::SUCCESS)
}

/// Outcome of `select-resolution`, mirroring [`SelectionOutcome`] in a
/// serializable shape (the engine type itself carries no `Serialize`, since
/// it's built for an in-process caller).
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum SelectResolutionOutput {
    /// No candidate cleared the confidence/impact thresholds.
    NoCandidate,
    /// Healing mode is `DISABLED`.
    Disabled,
    /// A resolution was created.
    Resolution {
        /// The created resolution.
        resolution: Resolution,
    },
}

/// Runs `select-resolution`.
async fn command_select_resolution(command: SelectResolutionCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let input: dto::SelectResolutionInput = parse_input(command.input.input.as_ref())?;

    let action_type_override =
        input.candidates.first().and_then(|candidate| {
            composition::action_type_override_for(&runtime.config, &candidate.action_type)
        });
    let owned_candidates: Vec<dto::OwnedCandidate> =
        input.candidates.iter().map(dto::OwnedCandidate::from).collect();
    let candidates = owned_candidates.iter().map(dto::OwnedCandidate::as_candidate).collect();

    let thresholds =
        SelectionThresholds { min_confidence: input.min_confidence, max_impact: input.max_impact };
    let approval_context = ApprovalContext {
        healing_mode: runtime.config.self_healing.mode,
        risk_score: input.risk_score,
        semi_automatic_risk_threshold: input.semi_automatic_risk_threshold,
        confidence_threshold: runtime.config.self_healing.confidence_threshold,
        action_type_override,
        business_hours: input.business_hours,
        business_hours_require_approval: input.business_hours_require_approval,
    };

    let outcome = runtime
        .resolution_selector
        .select(
            IssueId::new(input.issue_id),
            candidates,
            thresholds,
            approval_context,
            &input.requester,
        )
        .await?;
    let output = match outcome {
        SelectionOutcome::NoCandidate => SelectResolutionOutput::NoCandidate,
        SelectionOutcome::Disabled => SelectResolutionOutput::Disabled,
        SelectionOutcome::Resolution(resolution) => {
            SelectResolutionOutput::Resolution { resolution }
        }
    };
    write_json_line(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `approve`.
async fn command_approve(command: ApprovalDecisionCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let request = runtime
        .approval_manager
        .approve(&RequestId::new(command.request_id), command.approver)
        .await?;
    write_json_line(&request)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `reject`.
async fn command_reject(command: RejectCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    let request = runtime
        .approval_manager
        .reject(&RequestId::new(command.request_id), command.approver, command.reason)
        .await?;
    write_json_line(&request)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs `serve`: starts the escalation background worker, blocks until
/// interrupted, then stops it cleanly.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let runtime = open_runtime(&command.store)?;
    runtime.escalation.start_monitoring().await;
    tracing::info!("sentinel is running; press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| CliError::new(format!("failed to listen for ctrl-c: {err}")))?;
    runtime.escalation.stop_monitoring().await;
    Ok(ExitCode::SUCCESS)
}

/// Runs the `config` subcommands.
async fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Init => {
            write_stdout_line(&sentinel_config::config_toml_example()).map_err(io_error("stdout"))?;
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommand::Schema => {
            write_json_line(&sentinel_config::config_schema())?;
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommand::Validate(command) => {
            let config = SentinelConfig::load(command.config.as_deref())?;
            write_stdout_line(&format!(
                "configuration is valid ({} rules, {} routing rules)",
                config.alerting.rules.len(),
                config.notifications.routing_rules.len()
            ))
            .map_err(io_error("stdout"))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a JSON input body from `path`, or from stdin when `path` is `None`.
fn read_input_bytes(path: Option<&PathBuf>) -> CliResult<Vec<u8>> {
    let bytes = match path {
        Some(path) => std::fs::read(path).map_err(|err| {
            CliError::new(format!("failed to read input file {}: {err}", path.display()))
        })?,
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|err| CliError::new(format!("failed to read stdin: {err}")))?;
            buffer
        }
    };
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(CliError::new(format!("input exceeds size limit of {MAX_INPUT_BYTES} bytes")));
    }
    Ok(bytes)
}

/// Reads and parses a JSON input body into `T`.
fn parse_input<T: serde::de::DeserializeOwned>(path: Option<&PathBuf>) -> CliResult<T> {
    let bytes = read_input_bytes(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid JSON input: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Serializes `value` as pretty JSON and writes it to stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    write_stdout_line(&body).map_err(io_error("stdout"))
}

/// Builds a closure converting an `io::Error` on `stream` into a [`CliError`].
fn io_error(stream: &'static str) -> impl FnOnce(std::io::Error) -> CliError {
    move |err| CliError::new(format!("failed to write {stream}: {err}"))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
