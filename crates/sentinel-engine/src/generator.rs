// crates/sentinel-engine/src/generator.rs
// ============================================================================
// Module: Alert Generator (C4)
// Description: Orchestrates rule evaluation, correlation, persistence, and notification for new
//   alerts.
// Purpose: Give callers one call from "metrics tick" or "event" to "alerts notified and counted".
// Dependencies: sentinel_rules::RuleEngine, crate::correlator, sentinel_broker::NotificationRouter,
//   sentinel_core::AlertRepository
// ============================================================================

//! ## Overview
//! [`AlertGenerator::process_metrics`]/[`process_event`](AlertGenerator::process_event)
//! run the Rule Engine, turn triggered results into [`Alert`]s, correlate
//! each one, persist it, and — if not suppressed — dispatch a notification.
//! Notifications for a batch of alerts from one call are fanned out
//! concurrently across a bounded per-alert worker pool, distinct from the
//! Router's own per-channel pool (spec §5). [`AlertGenerator::generate_alert`]
//! is the direct, rule-free entry point for adapters that already know they
//! have something to report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use sentinel_broker::FallbackChannels;
use sentinel_broker::NotificationRouter;
use sentinel_broker::Recipients;
use sentinel_broker::RoutingFields;
use sentinel_broker::RoutingRule;
use sentinel_broker::format_message;
use sentinel_broker::resolve_channels;
use sentinel_core::Alert;
use sentinel_core::AlertId;
use sentinel_core::AlertRepository;
use sentinel_core::AlertStatus;
use sentinel_core::Channel;
use sentinel_core::Clock;
use sentinel_core::Context;
use sentinel_core::ExecutionId;
use sentinel_core::NotificationAttempt;
use sentinel_core::RepositoryError;
use sentinel_core::RuleEvaluationResult;
use sentinel_core::RuleId;
use sentinel_core::RuleType;
use sentinel_core::Severity;
use sentinel_rules::Event;
use sentinel_rules::RuleEngine;
use serde_json::Value;

use crate::correlator::AlertCorrelator;
use crate::counters::AlertCounters;
use crate::telemetry::AlertCreatedEvent;
use crate::telemetry::EventSink;
use crate::telemetry::NotificationDispatchedEvent;

/// Per-alert notification dispatch deadline (spec §4.4 item 4: "30s per alert").
pub const PER_ALERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by [`AlertGenerator`] pipeline calls.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The alert repository rejected a write or read.
    #[error("alert repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Orchestrates rule evaluation, correlation, persistence, and notification.
pub struct AlertGenerator {
    rule_engine: Arc<RuleEngine>,
    correlator: Arc<AlertCorrelator>,
    router: Arc<NotificationRouter>,
    repository: Arc<dyn AlertRepository>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    routing_rules: Vec<RoutingRule>,
    fallback_channels: FallbackChannels,
    recipients: Recipients,
    dispatch_semaphore: tokio::sync::Semaphore,
    counters: AlertCounters,
}

/// Dependencies and policy needed to build an [`AlertGenerator`], grouped so
/// the constructor doesn't take a dozen positional arguments.
pub struct GeneratorConfig {
    /// The validated rule set to evaluate.
    pub rule_engine: Arc<RuleEngine>,
    /// Groups and suppresses related alerts before they're notified.
    pub correlator: Arc<AlertCorrelator>,
    /// Dispatches notifications once an alert is admitted.
    pub router: Arc<NotificationRouter>,
    /// Durable alert storage.
    pub repository: Arc<dyn AlertRepository>,
    /// Source of `now`, injected for deterministic tests.
    pub clock: Arc<dyn Clock>,
    /// Observability sink; pass `NoopEventSink` to disable.
    pub events: Arc<dyn EventSink>,
    /// Routing rules consulted before the severity fallback table.
    pub routing_rules: Vec<RoutingRule>,
    /// Severity-keyed fallback channel sets.
    pub fallback_channels: FallbackChannels,
    /// Static per-deployment recipient addresses.
    pub recipients: Recipients,
    /// Bounds the number of alerts notified concurrently (spec default 10).
    pub max_concurrent_alerts: usize,
}

impl AlertGenerator {
    /// Builds a generator from `config`.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            rule_engine: config.rule_engine,
            correlator: config.correlator,
            router: config.router,
            repository: config.repository,
            clock: config.clock,
            events: config.events,
            routing_rules: config.routing_rules,
            fallback_channels: config.fallback_channels,
            recipients: config.recipients,
            dispatch_semaphore: tokio::sync::Semaphore::new(config.max_concurrent_alerts),
            counters: AlertCounters::default(),
        }
    }

    /// Runs THRESHOLD/TREND/ANOMALY/COMPOUND rules against `metrics`, then
    /// admits every triggered result (correlate, persist, notify if not
    /// suppressed).
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Repository`] if persisting any alert fails;
    /// alerts already persisted before the failing one are not rolled back.
    pub async fn process_metrics(
        &self,
        metrics: &Value,
        caller_context: &Context,
        historical_series: &HashMap<String, Vec<f64>>,
        component: Option<&str>,
        execution_id: Option<&ExecutionId>,
        only: Option<&[RuleId]>,
    ) -> Result<Vec<Alert>, GeneratorError> {
        let results =
            self.rule_engine.evaluate_metrics(metrics, caller_context, historical_series, only);
        self.process_triggered(results, caller_context, component, execution_id).await
    }

    /// Runs EVENT/PATTERN rules against `event`, then admits every triggered
    /// result (correlate, persist, notify if not suppressed).
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Repository`] if persisting any alert fails.
    pub async fn process_event(
        &self,
        event: &Event,
        caller_context: &Context,
        component: Option<&str>,
        execution_id: Option<&ExecutionId>,
        only: Option<&[RuleId]>,
    ) -> Result<Vec<Alert>, GeneratorError> {
        let results = self.rule_engine.evaluate_events(event, caller_context, only);
        self.process_triggered(results, caller_context, component, execution_id).await
    }

    /// Direct, rule-free entry point for adapters that already know they
    /// have something to report (spec §4.4: "also exposes a direct
    /// `generate_alert`... entry").
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Repository`] if persisting the alert fails.
    pub async fn generate_alert(
        &self,
        alert_type: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        context: Context,
        component: Option<String>,
        execution_id: Option<ExecutionId>,
        source: impl Into<String>,
    ) -> Result<Alert, GeneratorError> {
        let now = self.clock.now();
        let alert = Alert {
            alert_id: AlertId::generate(),
            alert_type: alert_type.into(),
            description: description.into(),
            severity,
            context,
            component,
            execution_id,
            source: source.into(),
            status: AlertStatus::New,
            created_at: now,
            updated_at: now,
            acknowledged_at: None,
            resolved_at: None,
            related_alerts: Vec::new(),
            notifications: Vec::new(),
            acknowledgment_details: None,
            resolution_details: None,
        };

        let (persisted, suppressed) = self.correlate_and_persist(alert, None).await?;
        if !suppressed {
            self.notify(&persisted).await;
        }
        Ok(persisted)
    }

    async fn process_triggered(
        &self,
        results: Vec<RuleEvaluationResult>,
        caller_context: &Context,
        component: Option<&str>,
        execution_id: Option<&ExecutionId>,
    ) -> Result<Vec<Alert>, GeneratorError> {
        let mut admitted = Vec::new();
        let mut to_notify = Vec::new();

        for result in results.into_iter().filter(|result| result.triggered) {
            let alert =
                self.build_alert_from_rule(&result, caller_context, component, execution_id);
            let (alert, suppressed) =
                self.correlate_and_persist(alert, Some(&result.rule_id)).await?;
            if !suppressed {
                to_notify.push(alert.clone());
            }
            admitted.push(alert);
        }

        join_all(to_notify.iter().map(|alert| self.notify(alert))).await;
        Ok(admitted)
    }

    fn build_alert_from_rule(
        &self,
        result: &RuleEvaluationResult,
        caller_context: &Context,
        component: Option<&str>,
        execution_id: Option<&ExecutionId>,
    ) -> Alert {
        let now = self.clock.now();
        let mut context = result.context.clone();
        for (key, value) in caller_context {
            context.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Alert {
            alert_id: AlertId::generate(),
            alert_type: format!("rule_{}", rule_family_tag(result.rule_type)),
            description: format!("rule '{}' triggered", result.rule_name),
            severity: result.severity,
            context,
            component: component.map(ToString::to_string),
            execution_id: execution_id.cloned(),
            source: "rule_engine".to_string(),
            status: AlertStatus::New,
            created_at: now,
            updated_at: now,
            acknowledged_at: None,
            resolved_at: None,
            related_alerts: Vec::new(),
            notifications: Vec::new(),
            acknowledgment_details: None,
            resolution_details: None,
        }
    }

    /// Correlates `alert`, persists it (suppressed or not), and appends its
    /// id to the group primary's `related_alerts` when suppressed. Returns
    /// the persisted record and whether it was suppressed.
    async fn correlate_and_persist(
        &self,
        mut alert: Alert,
        rule_id: Option<&RuleId>,
    ) -> Result<(Alert, bool), GeneratorError> {
        let outcome = self.correlator.correlate(&alert);
        alert.context.insert("group_id".to_string(), Value::String(outcome.group_id.to_string()));

        let suppressed = outcome.suppressed;
        if suppressed {
            let now = self.clock.now();
            let reason =
                outcome.suppression_reason.clone().unwrap_or_else(|| "suppressed".to_string());
            let _: Result<(), _> = alert.suppress(reason, now);
        }

        let persisted = self.repository.create(alert).await?;
        self.events.on_alert_created(AlertCreatedEvent {
            alert_id: &persisted.alert_id,
            rule_id,
            suppressed,
        });
        self.counters.record(
            persisted.severity,
            &persisted.alert_type,
            persisted.component.as_deref(),
            self.clock.now(),
        );

        if suppressed && outcome.primary_alert_id != persisted.alert_id {
            if let Ok(mut primary) = self.repository.get(&outcome.primary_alert_id).await {
                primary.related_alerts.push(persisted.alert_id.clone());
                let _: Result<_, _> = self.repository.update(primary).await;
            }
        }

        Ok((persisted, suppressed))
    }

    /// Formats and dispatches a notification for `alert`, bounded by the
    /// generator's own per-alert semaphore and [`PER_ALERT_TIMEOUT`]. A
    /// timed-out or resolved-to-no-channels dispatch is simply skipped:
    /// a single alert's failure to notify never blocks others (spec §4.9's
    /// failure-semantics note) and is never surfaced as a pipeline error.
    async fn notify(&self, alert: &Alert) {
        let Ok(_permit) = self.dispatch_semaphore.acquire().await else { return };

        let fields = RoutingFields {
            severity: alert.severity,
            alert_type: &alert.alert_type,
            context: &alert.context,
        };
        let channels = resolve_channels(None, &self.routing_rules, &self.fallback_channels, fields);
        if channels.is_empty() {
            return;
        }

        let message = format_message(
            alert.alert_id.to_string(),
            alert.alert_id.clone(),
            &alert.alert_type,
            &alert.description,
            alert.severity,
            &alert.context,
            alert.created_at,
        );

        let dispatch = self.router.dispatch(&message, &channels, &self.recipients);
        let Ok(results) = tokio::time::timeout(PER_ALERT_TIMEOUT, dispatch).await else { return };

        for (channel, result) in results {
            self.events.on_notification_dispatched(NotificationDispatchedEvent {
                alert_id: &alert.alert_id,
                channel: channel_tag(channel),
                success: result.success,
            });
            let mut details = Context::new();
            if let Some(error_message) = result.error_message {
                details.insert("error".to_string(), Value::String(error_message));
            }
            let attempt = NotificationAttempt {
                channel,
                recipient: recipient_label(channel, &self.recipients),
                success: result.success,
                details,
                timestamp: self.clock.now(),
            };
            let _: Result<(), _> = self.repository.add_notification(&alert.alert_id, attempt).await;
        }
    }
}

/// The lowercase family tag used in `rule_<family>` alert types.
const fn rule_family_tag(rule_type: RuleType) -> &'static str {
    match rule_type {
        RuleType::Threshold => "threshold",
        RuleType::Trend => "trend",
        RuleType::Anomaly => "anomaly",
        RuleType::Compound => "compound",
        RuleType::Event => "event",
        RuleType::Pattern => "pattern",
    }
}

/// Uppercase wire tag for a channel, used in telemetry events.
const fn channel_tag(channel: Channel) -> &'static str {
    match channel {
        Channel::Teams => "TEAMS",
        Channel::Email => "EMAIL",
    }
}

/// The configured recipient address for `channel`, recorded on the
/// [`NotificationAttempt`] for operator-facing history.
fn recipient_label(channel: Channel, recipients: &Recipients) -> String {
    match channel {
        Channel::Teams => recipients.teams_webhook_url.clone().unwrap_or_default(),
        Channel::Email => recipients.email_address.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sentinel_core::AlertStatus;
    use sentinel_core::DeliveryOutcome;
    use sentinel_core::EmailTransport;
    use sentinel_core::TeamsTransport;
    use sentinel_core::TimeRange;
    use sentinel_core::TransportError;
    use sentinel_rules::RuleEngine;
    use time::OffsetDateTime;

    use super::*;
    use crate::correlator::CorrelationPolicy;
    use crate::telemetry::NoopEventSink;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    struct AlwaysOkTransport;

    #[async_trait]
    impl TeamsTransport for AlwaysOkTransport {
        async fn send(
            &self,
            _webhook_url: &str,
            _message: &str,
        ) -> Result<DeliveryOutcome, TransportError> {
            Ok(DeliveryOutcome { success: true, details: Value::Null })
        }
    }

    #[async_trait]
    impl EmailTransport for AlwaysOkTransport {
        async fn send(
            &self,
            _recipient: &str,
            _subject: &str,
            _body: &str,
        ) -> Result<DeliveryOutcome, TransportError> {
            Ok(DeliveryOutcome { success: true, details: Value::Null })
        }
    }

    #[derive(Default)]
    struct InMemoryAlertRepository {
        alerts: Mutex<HashMap<String, Alert>>,
    }

    #[async_trait]
    impl AlertRepository for InMemoryAlertRepository {
        async fn create(&self, alert: Alert) -> Result<Alert, RepositoryError> {
            let Ok(mut alerts) = self.alerts.lock() else {
                return Err(RepositoryError::Unavailable("poisoned".to_string()));
            };
            alerts.insert(alert.alert_id.to_string(), alert.clone());
            Ok(alert)
        }

        async fn batch_create(&self, alerts: Vec<Alert>) -> Result<Vec<Alert>, RepositoryError> {
            let mut created = Vec::with_capacity(alerts.len());
            for alert in alerts {
                created.push(self.create(alert).await?);
            }
            Ok(created)
        }

        async fn get(&self, alert_id: &AlertId) -> Result<Alert, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else {
                return Err(RepositoryError::Unavailable("poisoned".to_string()));
            };
            alerts
                .get(&alert_id.to_string())
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(alert_id.to_string()))
        }

        async fn update(&self, alert: Alert) -> Result<Alert, RepositoryError> {
            self.create(alert).await
        }

        async fn query_by_status(
            &self,
            status: AlertStatus,
        ) -> Result<Vec<Alert>, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else { return Ok(Vec::new()) };
            Ok(alerts.values().filter(|alert| alert.status == status).cloned().collect())
        }

        async fn query_by_severity(
            &self,
            minimum: Severity,
        ) -> Result<Vec<Alert>, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else { return Ok(Vec::new()) };
            Ok(alerts.values().filter(|alert| alert.severity >= minimum).cloned().collect())
        }

        async fn query_by_component(
            &self,
            component: &str,
        ) -> Result<Vec<Alert>, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else { return Ok(Vec::new()) };
            Ok(alerts
                .values()
                .filter(|alert| alert.component.as_deref() == Some(component))
                .cloned()
                .collect())
        }

        async fn query_by_execution_id(
            &self,
            execution_id: &ExecutionId,
        ) -> Result<Vec<Alert>, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else { return Ok(Vec::new()) };
            Ok(alerts
                .values()
                .filter(|alert| alert.execution_id.as_ref() == Some(execution_id))
                .cloned()
                .collect())
        }

        async fn query_by_time_range(
            &self,
            _range: TimeRange,
        ) -> Result<Vec<Alert>, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else { return Ok(Vec::new()) };
            Ok(alerts.values().cloned().collect())
        }

        async fn get_active_alerts(&self) -> Result<Vec<Alert>, RepositoryError> {
            let Ok(alerts) = self.alerts.lock() else { return Ok(Vec::new()) };
            Ok(alerts.values().filter(|alert| !alert.status.is_terminal()).cloned().collect())
        }

        async fn count_by_status(&self, status: AlertStatus) -> Result<u64, RepositoryError> {
            Ok(self.query_by_status(status).await?.len() as u64)
        }

        async fn add_notification(
            &self,
            alert_id: &AlertId,
            attempt: NotificationAttempt,
        ) -> Result<(), RepositoryError> {
            let Ok(mut alerts) = self.alerts.lock() else {
                return Err(RepositoryError::Unavailable("poisoned".to_string()));
            };
            let alert = alerts
                .get_mut(&alert_id.to_string())
                .ok_or_else(|| RepositoryError::NotFound(alert_id.to_string()))?;
            alert.notifications.push(attempt);
            Ok(())
        }

        async fn delete_older_than(&self, _cutoff: OffsetDateTime) -> Result<u64, RepositoryError> {
            Ok(0)
        }
    }

    fn generator(repository: Arc<InMemoryAlertRepository>) -> AlertGenerator {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
        let router = Arc::new(NotificationRouter::new(
            Arc::new(AlwaysOkTransport),
            Arc::new(AlwaysOkTransport),
            10,
            24,
        ));
        let correlator = Arc::new(AlertCorrelator::new(
            Arc::clone(&clock),
            CorrelationPolicy { correlation_window_secs: 300, group_ttl_secs: 3600 },
            HashMap::new(),
        ));
        let rule_engine = Arc::new(RuleEngine::new(
            Arc::new(super::tests_support::NeverAnomalous),
            Arc::clone(&clock),
        ));
        AlertGenerator::new(GeneratorConfig {
            rule_engine,
            correlator,
            router,
            repository,
            clock,
            events: Arc::new(NoopEventSink),
            routing_rules: Vec::new(),
            fallback_channels: FallbackChannels::default(),
            recipients: Recipients {
                teams_webhook_url: Some("https://example.test/webhook".to_string()),
                email_address: Some("oncall@example.test".to_string()),
            },
            max_concurrent_alerts: 10,
        })
    }

    #[tokio::test]
    async fn direct_alert_is_persisted_and_notified() {
        let repository = Arc::new(InMemoryAlertRepository::default());
        let generator = generator(Arc::clone(&repository));

        let alert = generator
            .generate_alert(
                "pipeline_failure",
                "ingest job failed",
                Severity::Critical,
                BTreeMap::new(),
                Some("ingest".to_string()),
                None,
                "pipeline_adapter",
            )
            .await
            .expect("generate_alert succeeds");

        assert_eq!(alert.status, AlertStatus::New);
        let stored = repository.get(&alert.alert_id).await.expect("stored");
        assert_eq!(stored.notifications.len(), 2);
        assert!(stored.notifications.iter().all(|attempt| attempt.success));
    }

    #[tokio::test]
    async fn second_alert_in_same_window_is_suppressed_and_not_notified() {
        let repository = Arc::new(InMemoryAlertRepository::default());
        let generator = generator(Arc::clone(&repository));

        let first = generator
            .generate_alert(
                "pipeline_failure",
                "ingest job failed",
                Severity::High,
                BTreeMap::new(),
                Some("ingest".to_string()),
                None,
                "pipeline_adapter",
            )
            .await
            .expect("first succeeds");
        let second = generator
            .generate_alert(
                "pipeline_failure",
                "ingest job failed again",
                Severity::High,
                BTreeMap::new(),
                Some("ingest".to_string()),
                None,
                "pipeline_adapter",
            )
            .await
            .expect("second succeeds");

        assert_eq!(first.status, AlertStatus::New);
        assert_eq!(second.status, AlertStatus::Suppressed);
        assert!(second.notifications.is_empty());

        let primary = repository.get(&first.alert_id).await.expect("primary stored");
        assert_eq!(primary.related_alerts, vec![second.alert_id.clone()]);
    }
}

#[cfg(test)]
mod tests_support {
    use sentinel_core::AnomalyDetector;

    pub struct NeverAnomalous;

    impl AnomalyDetector for NeverAnomalous {
        fn detect_anomaly(
            &self,
            _series: &[f64],
            _algorithm: &str,
            _sensitivity: f64,
            _metric_name: &str,
        ) -> bool {
            false
        }
    }
}
