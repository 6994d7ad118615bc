// crates/sentinel-cli/src/composition.rs
// ============================================================================
// Module: Composition Root
// Description: Wires a loaded SentinelConfig and an open SqliteStore into every engine/broker
//   component.
// Purpose: Single place that converts config DTOs into engine/broker runtime types.
// Dependencies: sentinel-config, sentinel-engine, sentinel-broker, sentinel-providers,
//   sentinel-store-sqlite
// ============================================================================

//! ## Overview
//! `sentinel-config` deliberately stops at a plain data model and documents
//! the composition root as the place that turns its DTOs into runtime
//! types (see that crate's own overview). [`build`] is that place for this
//! binary: it opens the `SQLite` store, builds the default providers
//! (`SystemClock`, `ZScoreAnomalyDetector`, transports, shell executor),
//! converts every config section into its matching engine/broker type, and
//! returns a [`Runtime`] the command handlers share.
//!
//! The correlation window, rate limits, and group TTL consulted by
//! [`sentinel_engine::AlertCorrelator`] have no `sentinel-config` section —
//! the spec itself leaves them as "configured parameters" without further
//! definition, and no uniform default exists in the source this was
//! distilled from. This composition root hardcodes conservative defaults
//! (5-minute correlation window, 1-hour group TTL, no per-type rate
//! limits) rather than inventing a config surface the spec never
//! described; see `DESIGN.md`'s resolved Open Question on this point.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sentinel_broker::FallbackChannels;
use sentinel_broker::NotificationRouter;
use sentinel_broker::Recipients;
use sentinel_broker::RoutingRule;
use sentinel_broker::RuleCondition;
use sentinel_config::ActionTypeOverrideConfig;
use sentinel_config::RuleConditionConfig;
use sentinel_config::SentinelConfig;
use sentinel_core::AlertRepository;
use sentinel_core::ApprovalRepository;
use sentinel_core::Channel;
use sentinel_core::Clock;
use sentinel_core::EmailTransport;
use sentinel_core::HealingExecutor;
use sentinel_core::TeamsTransport;
use sentinel_engine::AddTable;
use sentinel_engine::ActionBaseImpact;
use sentinel_engine::ActionTypeOverride;
use sentinel_engine::AlertCorrelator;
use sentinel_engine::AlertGenerator;
use sentinel_engine::ApprovalManager;
use sentinel_engine::ConfidenceScorer;
use sentinel_engine::CorrelationPolicy;
use sentinel_engine::EscalationConfig as EngineEscalationConfig;
use sentinel_engine::EscalationManager;
use sentinel_engine::EscalationPolicy as EngineEscalationPolicy;
use sentinel_engine::GeneratorConfig;
use sentinel_engine::ImpactAnalyzer;
use sentinel_engine::ImpactWeights;
use sentinel_engine::RateLimitPolicy;
use sentinel_engine::ResolutionSelector;
use sentinel_engine::StderrEventSink;
use sentinel_providers::CommandTemplate;
use sentinel_providers::ShellHealingExecutor;
use sentinel_providers::SmtpEmailTransport;
use sentinel_providers::SystemClock;
use sentinel_providers::TeamsWebhookTransport;
use sentinel_providers::ZScoreAnomalyDetector;
use sentinel_rules::RuleEngine;
use sentinel_store_sqlite::SqliteStore;
use sentinel_store_sqlite::SqliteStoreConfig;

/// Correlation window hardcoded in the absence of a config section (see
/// this module's overview): 5 minutes.
const DEFAULT_CORRELATION_WINDOW_SECS: u64 = 300;
/// Group TTL hardcoded in the absence of a config section: 1 hour.
const DEFAULT_GROUP_TTL_SECS: u64 = 3_600;
/// Shell executor per-action timeout.
const EXECUTOR_TIMEOUT: Duration = Duration::from_secs(60);

/// Every wired component a command handler needs, built once at startup.
pub struct Runtime {
    /// Durable alert storage.
    pub alert_repository: Arc<dyn AlertRepository>,
    /// Durable approval-request storage.
    pub approval_repository: Arc<dyn ApprovalRepository>,
    /// Source of `now` for every time-sensitive component.
    pub clock: Arc<dyn Clock>,
    /// Validated rule set evaluated against metrics and events.
    pub rule_engine: Arc<RuleEngine>,
    /// Fans out notifications to configured channels.
    pub router: Arc<NotificationRouter>,
    /// Groups and suppresses related alerts.
    pub correlator: Arc<AlertCorrelator>,
    /// Orchestrates rule evaluation, correlation, persistence, notification.
    pub generator: Arc<AlertGenerator>,
    /// Drives the background escalation worker.
    pub escalation: Arc<EscalationManager>,
    /// Decides and mediates approval requirements.
    pub approval_manager: Arc<ApprovalManager>,
    /// Picks the best candidate action for an issue.
    pub resolution_selector: Arc<ResolutionSelector>,
    /// The loaded configuration this runtime was built from.
    pub config: SentinelConfig,
}

/// Builds every component from `config` and an opened `store`.
///
/// # Errors
///
/// Returns a [`BuildError`] if a configured transport cannot be
/// constructed (invalid relay host or `from` address).
pub fn build(config: SentinelConfig, store: &SqliteStore) -> Result<Runtime, BuildError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let events: Arc<dyn sentinel_engine::EventSink> = Arc::new(StderrEventSink);
    let alert_repository: Arc<dyn AlertRepository> = Arc::new(store.alert_repository());
    let approval_repository: Arc<dyn ApprovalRepository> = Arc::new(store.approval_repository());

    let rule_engine = Arc::new(build_rule_engine(&config, Arc::clone(&clock)));
    let router = Arc::new(build_router(&config)?);
    let correlator = Arc::new(AlertCorrelator::new(
        Arc::clone(&clock),
        CorrelationPolicy {
            correlation_window_secs: DEFAULT_CORRELATION_WINDOW_SECS,
            group_ttl_secs: DEFAULT_GROUP_TTL_SECS,
        },
        HashMap::<String, RateLimitPolicy>::new(),
    ));

    let generator = Arc::new(AlertGenerator::new(GeneratorConfig {
        rule_engine: Arc::clone(&rule_engine),
        correlator: Arc::clone(&correlator),
        router: Arc::clone(&router),
        repository: Arc::clone(&alert_repository),
        clock: Arc::clone(&clock),
        events: Arc::clone(&events),
        routing_rules: build_routing_rules(&config),
        fallback_channels: FallbackChannels::default(),
        recipients: build_recipients(&config),
        max_concurrent_alerts: config.alerting.max_concurrent_alerts,
    }));

    let escalation = Arc::new(EscalationManager::new(
        Arc::clone(&alert_repository),
        Arc::clone(&router),
        Arc::clone(&clock),
        Arc::clone(&events),
        build_escalation_config(&config),
    ));

    let approval_manager = Arc::new(ApprovalManager::new(
        Arc::clone(&approval_repository),
        Arc::clone(&clock),
        Arc::clone(&events),
        config.self_healing.approval_expiration_hours,
    ));

    let executor: Arc<dyn HealingExecutor> = Arc::new(build_executor(&config));

    let resolution_selector = Arc::new(ResolutionSelector::new(
        ConfidenceScorer::default(),
        build_impact_analyzer(&config),
        Arc::clone(&approval_manager),
        executor,
        Arc::clone(&events),
        config.self_healing.max_retry_attempts,
    ));

    Ok(Runtime {
        alert_repository,
        approval_repository,
        clock,
        rule_engine,
        router,
        correlator,
        generator,
        escalation,
        approval_manager,
        resolution_selector,
        config,
    })
}

/// Opens the configured `SQLite` store at `path`, defaulting to
/// `sentinel.db` in the current directory.
///
/// # Errors
///
/// Returns a [`BuildError`] if the store cannot be opened.
pub fn open_store(path: Option<std::path::PathBuf>) -> Result<SqliteStore, BuildError> {
    let path = path.unwrap_or_else(|| std::path::PathBuf::from("sentinel.db"));
    SqliteStore::open(SqliteStoreConfig {
        path,
        busy_timeout_ms: 5_000,
        journal_mode: sentinel_store_sqlite::SqliteStoreMode::Wal,
    })
    .map_err(|err| BuildError::Store(err.to_string()))
}

/// Builds a [`RuleEngine`] with the default z-score anomaly detector and
/// every configured rule upserted.
fn build_rule_engine(config: &SentinelConfig, clock: Arc<dyn Clock>) -> RuleEngine {
    let anomaly_detector: Arc<dyn sentinel_core::AnomalyDetector> = Arc::new(ZScoreAnomalyDetector);
    let engine = RuleEngine::new(anomaly_detector, clock);
    for rule in &config.alerting.rules {
        // A config file already validated at load time should never
        // produce a rejected rule; log and skip rather than aborting
        // startup over one bad entry.
        if let Err(error) = engine.upsert_rule(rule.clone()) {
            tracing::warn!(rule_id = %rule.rule_id, %error, "rule rejected by engine at startup");
        }
    }
    engine
}

/// Builds the [`NotificationRouter`] with a Teams transport always present
/// and an email transport present only when configured.
fn build_router(config: &SentinelConfig) -> Result<NotificationRouter, BuildError> {
    let teams: Arc<dyn TeamsTransport> = Arc::new(TeamsWebhookTransport::default());
    let email: Arc<dyn EmailTransport> = match &config.notifications.channels.email {
        Some(email_config) => Arc::new(
            SmtpEmailTransport::new(
                &email_config.relay_host,
                &email_config.username,
                &email_config.password,
                &email_config.from,
            )
            .map_err(|err| BuildError::Transport(err.to_string()))?,
        ),
        None => Arc::new(NullEmailTransport),
    };
    Ok(NotificationRouter::new(
        teams,
        email,
        config.notifications.max_concurrent_notifications,
        config.notifications.history_retention_hours,
    ))
}

/// Static per-deployment recipient addresses from the configured channels.
fn build_recipients(config: &SentinelConfig) -> Recipients {
    Recipients {
        teams_webhook_url: config
            .notifications
            .channels
            .teams
            .as_ref()
            .map(|teams| teams.webhook_url.clone()),
        email_address: config
            .notifications
            .channels
            .email
            .as_ref()
            .map(|email| email.from.clone()),
    }
}

/// Converts every configured routing rule into its broker runtime type.
fn build_routing_rules(config: &SentinelConfig) -> Vec<RoutingRule> {
    config
        .notifications
        .routing_rules
        .iter()
        .map(|rule| RoutingRule {
            conditions: rule.conditions.iter().map(convert_condition).collect(),
            channels: rule.channels.iter().copied().collect::<BTreeSet<Channel>>(),
        })
        .collect()
}

/// Converts one routing-rule condition into its broker runtime type.
fn convert_condition(condition: &RuleConditionConfig) -> RuleCondition {
    match condition {
        RuleConditionConfig::Severity { severity } => RuleCondition::Severity(*severity),
        RuleConditionConfig::Equals { field, value } => {
            RuleCondition::Equals { field: field.clone(), value: value.clone() }
        }
    }
}

/// Converts the configured escalation policies and targets into the
/// engine's runtime [`EngineEscalationConfig`].
fn build_escalation_config(config: &SentinelConfig) -> EngineEscalationConfig {
    let mut policies = HashMap::new();
    for policy in &config.escalation.escalation_policies {
        let timeframes =
            policy.timeframes.iter().map(|entry| (entry.level, entry.minutes)).collect();
        policies.insert(
            policy.severity,
            EngineEscalationPolicy { levels: policy.levels.clone(), timeframes },
        );
    }

    let mut targets = HashMap::new();
    for target in &config.escalation.escalation_targets {
        targets.insert(
            (target.level, target.severity),
            Recipients {
                teams_webhook_url: target.teams_webhook_url.clone(),
                email_address: target.email_address.clone(),
            },
        );
    }

    EngineEscalationConfig {
        policies,
        targets,
        interval_secs: config.escalation.check_interval_seconds,
    }
}

/// Builds an [`ImpactAnalyzer`] from the configured weights and per-action
/// base-impact table.
fn build_impact_analyzer(config: &SentinelConfig) -> ImpactAnalyzer {
    let weights = ImpactWeights {
        data: config.self_healing.impact_weights.data,
        pipeline: config.self_healing.impact_weights.pipeline,
        business: config.self_healing.impact_weights.business,
        resource: config.self_healing.impact_weights.resource,
    };
    let mut base_impact = ActionBaseImpact::default();
    for entry in sentinel_config::action_base_impact_map(&config.self_healing.action_base_impact) {
        base_impact.set(entry.0, entry.1);
    }
    ImpactAnalyzer::new(weights, base_impact, AddTable::default())
}

/// Builds a [`ShellHealingExecutor`] with a placeholder command registered
/// for every action type named in the base-impact table (see the body
/// comment for why this is a placeholder).
fn build_executor(config: &SentinelConfig) -> ShellHealingExecutor {
    let mut executor = ShellHealingExecutor::new(EXECUTOR_TIMEOUT);
    for entry in &config.self_healing.action_base_impact {
        // Registers a harmless `true`/no-op command for every known action
        // type so a freshly configured deployment has something runnable;
        // real deployments override these via their own config-driven
        // command table (spec's Non-goal: "defining what each action type
        // actually runs"). Without a dedicated executor config section
        // this is the most faithful default available.
        executor.register(
            entry.action_type.clone(),
            CommandTemplate { program: "true".to_string(), args: Vec::new() },
        );
    }
    executor
}

/// Looks up the single per-action-type approval override applicable to a
/// selection call. The engine's [`sentinel_engine::ApprovalContext`] carries
/// one override for the whole call, not one per candidate, so callers with
/// mixed action types must pick one (here: the first candidate's, if
/// configured) — see `DESIGN.md`'s resolved Open Question on this
/// limitation.
#[must_use]
pub fn action_type_override_for(
    config: &SentinelConfig,
    action_type: &str,
) -> Option<ActionTypeOverride> {
    config
        .self_healing
        .action_type_overrides
        .iter()
        .find(|entry| entry.action_type == action_type)
        .map(|entry| convert_override(entry.r#override))
}

/// Converts a config-side override enum into the engine's runtime type.
const fn convert_override(value: ActionTypeOverrideConfig) -> ActionTypeOverride {
    match value {
        ActionTypeOverrideConfig::Always => ActionTypeOverride::Always,
        ActionTypeOverrideConfig::Never => ActionTypeOverride::Never,
        ActionTypeOverrideConfig::HighImpactOnly => ActionTypeOverride::HighImpactOnly,
        ActionTypeOverrideConfig::CriticalOnly => ActionTypeOverride::CriticalOnly,
    }
}

/// A no-op [`EmailTransport`] used when no email channel is configured, so
/// the router always has something to call even if every dispatch reports
/// [`sentinel_core::TransportError::Rejected`].
#[derive(Debug, Clone, Copy, Default)]
struct NullEmailTransport;

#[async_trait::async_trait]
impl EmailTransport for NullEmailTransport {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<sentinel_core::DeliveryOutcome, sentinel_core::TransportError> {
        Err(sentinel_core::TransportError::Rejected("no email channel configured".to_string()))
    }
}

/// Errors building a [`Runtime`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The `SQLite` store could not be opened.
    #[error("store error: {0}")]
    Store(String),
    /// A configured transport could not be constructed.
    #[error("transport error: {0}")]
    Transport(String),
}
