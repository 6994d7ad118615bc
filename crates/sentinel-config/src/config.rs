// crates/sentinel-config/src/config.rs
// ============================================================================
// Module: Sentinel Configuration
// Description: Configuration loading and validation for the decision core.
// Purpose: Provide strict, fail-closed config parsing with documented defaults.
// Dependencies: sentinel-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with a hard size limit. A
//! missing file falls back to defaults everywhere except `alerting.rules`,
//! which then stays empty (spec §6: "self-healing defaults to `disabled`
//! when the key is absent"). On reload failure the caller keeps the prior
//! config (spec §7) — this crate only parses and validates one snapshot at
//! a time, it never rewrites its own input.
//!
//! This crate defines a plain data model, not the engine/broker runtime
//! types (`sentinel_engine::EscalationPolicy`, `sentinel_broker::RoutingRule`,
//! and so on). The composition root converts these DTOs into those runtime
//! types when wiring components — see `DESIGN.md`'s resolved Open Question
//! on this boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use sentinel_core::HealingMode;
use sentinel_core::Rule;
use sentinel_core::Severity;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sentinel.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SENTINEL_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

/// `self_healing.confidence_threshold` default (spec §6).
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.85;
/// `self_healing.max_retry_attempts` default (spec §6).
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
/// `self_healing.approval_expiration_hours` default (spec §6).
pub const DEFAULT_APPROVAL_EXPIRATION_HOURS: i64 = 24;
/// `self_healing.critical_impact_threshold` default, matching
/// `sentinel_core::ImpactLevel::from_overall`'s `CRITICAL` cutoff.
pub const DEFAULT_CRITICAL_IMPACT_THRESHOLD: f64 = 0.8;
/// `notifications.max_concurrent_notifications` default (spec §6).
pub const DEFAULT_MAX_CONCURRENT_NOTIFICATIONS: usize = 10;
/// `notifications.history_retention_hours` default (spec §6).
pub const DEFAULT_HISTORY_RETENTION_HOURS: u64 = 24;
/// `alerting.max_concurrent_alerts` default (spec §6).
pub const DEFAULT_MAX_CONCURRENT_ALERTS: usize = 10;
/// `escalation.check_interval_seconds` default, matching
/// `sentinel_engine::escalation::DEFAULT_INTERVAL_SECS`.
pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;

// ============================================================================
// SECTION: Top-Level Configuration
// ============================================================================

/// The decision core's full recognized configuration surface (spec §6).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentinelConfig {
    /// Self-healing / resolution-selection configuration.
    #[serde(default)]
    pub self_healing: SelfHealingConfig,
    /// Notification channel and routing configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Alert rule set and concurrency limits.
    #[serde(default)]
    pub alerting: AlertingConfig,
    /// Escalation worker configuration.
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Config source metadata, not itself configurable.
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl SentinelConfig {
    /// Loads configuration from disk using the default resolution rules:
    /// `path`, else `SENTINEL_CONFIG`, else `sentinel.toml` in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds
    /// [`MAX_CONFIG_FILE_SIZE`], is not valid UTF-8, fails to parse as TOML,
    /// or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_err| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any sub-config is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.self_healing.validate()?;
        self.notifications.validate()?;
        self.alerting.validate()?;
        self.escalation.validate()?;
        Ok(())
    }
}

fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(env_path);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

// ============================================================================
// SECTION: Self-Healing Configuration
// ============================================================================

fn default_healing_mode() -> HealingMode {
    HealingMode::Disabled
}

const fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

const fn default_max_retry_attempts() -> u32 {
    DEFAULT_MAX_RETRY_ATTEMPTS
}

const fn default_approval_expiration_hours() -> i64 {
    DEFAULT_APPROVAL_EXPIRATION_HOURS
}

const fn default_critical_impact_threshold() -> f64 {
    DEFAULT_CRITICAL_IMPACT_THRESHOLD
}

/// `self_healing.*` — spec §6 and §4.6-§4.9.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfHealingConfig {
    /// Gates whether the Resolution Selector executes, recommends, or does
    /// nothing (default `disabled`: self-healing is opt-in).
    #[serde(default = "default_healing_mode")]
    pub mode: HealingMode,
    /// Minimum confidence a candidate action must clear.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Execution attempt cap before a resolution's `FAILED` status becomes terminal.
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    /// Approval request TTL, in hours, before it lazily expires.
    #[serde(default = "default_approval_expiration_hours")]
    pub approval_expiration_hours: i64,
    /// Per-category weights feeding the Impact Analyzer's weighted mean.
    #[serde(default)]
    pub impact_weights: ImpactWeightsConfig,
    /// Overall-score cutoffs bucketing an impact analysis into a level.
    #[serde(default)]
    pub impact_thresholds: ImpactThresholdsConfig,
    /// Overall-score floor above which impact is always `CRITICAL`,
    /// independent of [`ImpactThresholdsConfig`] (spec §6).
    #[serde(default = "default_critical_impact_threshold")]
    pub critical_impact_threshold: f64,
    /// Per-action-type base impact scores consulted before weighting.
    #[serde(default)]
    pub action_base_impact: Vec<ActionBaseImpactEntry>,
    /// Per-action-type overrides of the approval requirement (spec §4.8).
    #[serde(default)]
    pub action_type_overrides: Vec<ActionTypeOverrideEntry>,
}

impl Default for SelfHealingConfig {
    fn default() -> Self {
        Self {
            mode: default_healing_mode(),
            confidence_threshold: default_confidence_threshold(),
            max_retry_attempts: default_max_retry_attempts(),
            approval_expiration_hours: default_approval_expiration_hours(),
            impact_weights: ImpactWeightsConfig::default(),
            impact_thresholds: ImpactThresholdsConfig::default(),
            critical_impact_threshold: default_critical_impact_threshold(),
            action_base_impact: Vec::new(),
            action_type_overrides: Vec::new(),
        }
    }
}

impl SelfHealingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(
                "self_healing.confidence_threshold must be in [0,1]".to_string(),
            ));
        }
        if self.max_retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "self_healing.max_retry_attempts must be greater than zero".to_string(),
            ));
        }
        if self.approval_expiration_hours <= 0 {
            return Err(ConfigError::Invalid(
                "self_healing.approval_expiration_hours must be positive".to_string(),
            ));
        }
        self.impact_weights.validate()?;
        self.impact_thresholds.validate()?;
        if !(0.0..=1.0).contains(&self.critical_impact_threshold) {
            return Err(ConfigError::Invalid(
                "self_healing.critical_impact_threshold must be in [0,1]".to_string(),
            ));
        }
        for entry in &self.action_base_impact {
            if !(0.0..=1.0).contains(&entry.base) {
                return Err(ConfigError::Invalid(format!(
                    "self_healing.action_base_impact[{}].base must be in [0,1]",
                    entry.action_type
                )));
            }
        }
        Ok(())
    }
}

/// `self_healing.impact_weights` — per-category weighting (spec §4.7).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImpactWeightsConfig {
    /// Weight applied to the DATA category.
    #[serde(default = "default_weight_data")]
    pub data: f64,
    /// Weight applied to the PIPELINE category.
    #[serde(default = "default_weight_pipeline")]
    pub pipeline: f64,
    /// Weight applied to the BUSINESS category.
    #[serde(default = "default_weight_business")]
    pub business: f64,
    /// Weight applied to the RESOURCE category.
    #[serde(default = "default_weight_resource")]
    pub resource: f64,
}

const fn default_weight_data() -> f64 {
    0.4
}
const fn default_weight_pipeline() -> f64 {
    0.3
}
const fn default_weight_business() -> f64 {
    0.2
}
const fn default_weight_resource() -> f64 {
    0.1
}

impl Default for ImpactWeightsConfig {
    fn default() -> Self {
        Self {
            data: default_weight_data(),
            pipeline: default_weight_pipeline(),
            business: default_weight_business(),
            resource: default_weight_resource(),
        }
    }
}

impl ImpactWeightsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.data + self.pipeline + self.business + self.resource;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "self_healing.impact_weights must sum to 1.0 (got {sum})"
            )));
        }
        Ok(())
    }
}

/// `self_healing.impact_thresholds` — overall-score cutoffs for
/// `LOW < MEDIUM < HIGH < CRITICAL`, matching
/// `sentinel_core::ImpactLevel::from_overall`'s built-in bucketing.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImpactThresholdsConfig {
    /// Overall score at or above which impact is at least `MEDIUM`.
    #[serde(default = "default_threshold_medium")]
    pub medium: f64,
    /// Overall score at or above which impact is at least `HIGH`.
    #[serde(default = "default_threshold_high")]
    pub high: f64,
    /// Overall score at or above which impact is `CRITICAL`.
    #[serde(default = "default_threshold_critical")]
    pub critical: f64,
}

const fn default_threshold_medium() -> f64 {
    0.3
}
const fn default_threshold_high() -> f64 {
    0.6
}
const fn default_threshold_critical() -> f64 {
    0.8
}

impl Default for ImpactThresholdsConfig {
    fn default() -> Self {
        Self {
            medium: default_threshold_medium(),
            high: default_threshold_high(),
            critical: default_threshold_critical(),
        }
    }
}

impl ImpactThresholdsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.medium < self.high && self.high < self.critical) {
            return Err(ConfigError::Invalid(
                "self_healing.impact_thresholds must be strictly ascending (medium < high < critical)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// One `self_healing.action_base_impact` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionBaseImpactEntry {
    /// The action type this base impact applies to.
    pub action_type: String,
    /// Base impact score in `[0,1]`, before weighting.
    pub base: f64,
}

/// Mirrors `sentinel_engine::approval::ActionTypeOverride`, kept as its own
/// type so this crate has no dependency on `sentinel-engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTypeOverrideConfig {
    /// Always require approval for this action type.
    Always,
    /// Never require approval for this action type.
    Never,
    /// Require only when the computed impact is `HIGH` or `CRITICAL`.
    HighImpactOnly,
    /// Require only when the computed impact is `CRITICAL`.
    CriticalOnly,
}

/// One `self_healing.action_type_overrides` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionTypeOverrideEntry {
    /// The action type this override applies to.
    pub action_type: String,
    /// The override behavior.
    pub r#override: ActionTypeOverrideConfig,
}

// ============================================================================
// SECTION: Notifications Configuration
// ============================================================================

const fn default_max_concurrent_notifications() -> usize {
    DEFAULT_MAX_CONCURRENT_NOTIFICATIONS
}

const fn default_history_retention_hours() -> u64 {
    DEFAULT_HISTORY_RETENTION_HOURS
}

/// `notifications.*` — spec §6 and §4.3.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Per-channel credentials and endpoints.
    #[serde(default)]
    pub channels: ChannelsConfig,
    /// Rules contributing channels before the severity fallback applies.
    #[serde(default)]
    pub routing_rules: Vec<RoutingRuleConfig>,
    /// Bounds total in-flight channel dispatches across every call.
    #[serde(default = "default_max_concurrent_notifications")]
    pub max_concurrent_notifications: usize,
    /// TTL, in hours, for the in-memory delivery history.
    #[serde(default = "default_history_retention_hours")]
    pub history_retention_hours: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            channels: ChannelsConfig::default(),
            routing_rules: Vec::new(),
            max_concurrent_notifications: default_max_concurrent_notifications(),
            history_retention_hours: default_history_retention_hours(),
        }
    }
}

impl NotificationsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_notifications == 0 {
            return Err(ConfigError::Invalid(
                "notifications.max_concurrent_notifications must be greater than zero".to_string(),
            ));
        }
        for rule in &self.routing_rules {
            if rule.channels.is_empty() {
                return Err(ConfigError::Invalid(
                    "notifications.routing_rules entries must name at least one channel".to_string(),
                ));
            }
        }
        if let Some(teams) = &self.channels.teams {
            teams.validate()?;
        }
        if let Some(email) = &self.channels.email {
            email.validate()?;
        }
        Ok(())
    }
}

/// `notifications.channels.*`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsConfig {
    /// Microsoft Teams incoming-webhook configuration.
    pub teams: Option<TeamsChannelConfig>,
    /// SMTP email transport configuration.
    pub email: Option<EmailChannelConfig>,
}

/// `notifications.channels.teams`.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamsChannelConfig {
    /// The incoming-webhook URL messages are posted to.
    pub webhook_url: String,
}

impl TeamsChannelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "notifications.channels.teams.webhook_url must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `notifications.channels.email`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailChannelConfig {
    /// SMTP relay hostname.
    pub relay_host: String,
    /// SMTP auth username.
    pub username: String,
    /// SMTP auth password.
    pub password: String,
    /// Envelope `from` address.
    pub from: String,
}

impl EmailChannelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.relay_host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "notifications.channels.email.relay_host must be non-empty".to_string(),
            ));
        }
        if self.from.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "notifications.channels.email.from must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One `notifications.routing_rules` entry: every condition must hold for
/// its channels to be contributed.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingRuleConfig {
    /// Conditions that must all match.
    #[serde(default)]
    pub conditions: Vec<RuleConditionConfig>,
    /// Channels contributed when every condition matches.
    pub channels: Vec<sentinel_core::Channel>,
}

/// One condition in a [`RoutingRuleConfig`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConditionConfig {
    /// Field must equal this severity exactly.
    Severity {
        /// The required severity.
        severity: Severity,
    },
    /// Field must equal this JSON value exactly.
    Equals {
        /// The message field to compare (e.g. `alert_type`, or a context key).
        field: String,
        /// The value the field must equal.
        value: serde_json::Value,
    },
}

// ============================================================================
// SECTION: Alerting Configuration
// ============================================================================

const fn default_max_concurrent_alerts() -> usize {
    DEFAULT_MAX_CONCURRENT_ALERTS
}

/// `alerting.*` — spec §6 and §4.1-§4.2.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertingConfig {
    /// The rule set evaluated by the Rule Engine.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Bounds the number of alerts notified concurrently.
    #[serde(default = "default_max_concurrent_alerts")]
    pub max_concurrent_alerts: usize,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self { rules: Vec::new(), max_concurrent_alerts: default_max_concurrent_alerts() }
    }
}

impl AlertingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_alerts == 0 {
            return Err(ConfigError::Invalid(
                "alerting.max_concurrent_alerts must be greater than zero".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::with_capacity(self.rules.len());
        for rule in &self.rules {
            if !seen.insert(rule.rule_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "alerting.rules contains duplicate rule_id {}",
                    rule.rule_id.as_str()
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Escalation Configuration
// ============================================================================

const fn default_check_interval_seconds() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECONDS
}

/// `escalation.*` — spec §6 and §4.5.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// How often the escalation worker wakes and re-evaluates active alerts.
    #[serde(default = "default_check_interval_seconds")]
    pub check_interval_seconds: u64,
    /// Per-severity escalation levels and their minutes-elapsed thresholds.
    #[serde(default)]
    pub escalation_policies: Vec<EscalationPolicyConfig>,
    /// Recipients notified at each `(level, severity)` pair.
    #[serde(default)]
    pub escalation_targets: Vec<EscalationTargetConfig>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval_seconds(),
            escalation_policies: Vec::new(),
            escalation_targets: Vec::new(),
        }
    }
}

impl EscalationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "escalation.check_interval_seconds must be greater than zero".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::with_capacity(self.escalation_policies.len());
        for policy in &self.escalation_policies {
            if !seen.insert(policy.severity) {
                return Err(ConfigError::Invalid(format!(
                    "escalation.escalation_policies contains duplicate severity {:?}",
                    policy.severity
                )));
            }
            policy.validate()?;
        }
        Ok(())
    }
}

/// One `escalation.escalation_policies` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationPolicyConfig {
    /// The severity this policy applies to.
    pub severity: Severity,
    /// Ascending list of escalation levels this policy can reach.
    pub levels: Vec<u8>,
    /// `level → minutes elapsed before that level is reached`.
    pub timeframes: Vec<EscalationTimeframeEntry>,
}

impl EscalationPolicyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "escalation.escalation_policies[{:?}].levels must be non-empty",
                self.severity
            )));
        }
        if !self.levels.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(ConfigError::Invalid(format!(
                "escalation.escalation_policies[{:?}].levels must be strictly ascending",
                self.severity
            )));
        }
        Ok(())
    }
}

/// One `level → minutes` entry in an [`EscalationPolicyConfig`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EscalationTimeframeEntry {
    /// The escalation level this timeframe gates.
    pub level: u8,
    /// Minutes elapsed before `level` is reached.
    pub minutes: u64,
}

/// One `escalation.escalation_targets` entry: who to notify at `(level,
/// severity)`. Unset channel fields fall back to the router's own
/// severity-fallback channel resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationTargetConfig {
    /// The escalation level this target applies to.
    pub level: u8,
    /// The severity this target applies to.
    pub severity: Severity,
    /// Teams incoming-webhook URL to notify at this level/severity.
    pub teams_webhook_url: Option<String>,
    /// Email address to notify at this level/severity.
    pub email_address: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned while loading or validating [`SentinelConfig`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-action-type base impact, keyed for the Impact Analyzer to consume
/// directly (see `sentinel_engine::impact::ActionBaseImpact`).
#[must_use]
pub fn action_base_impact_map(entries: &[ActionBaseImpactEntry]) -> HashMap<String, f64> {
    entries.iter().map(|entry| (entry.action_type.clone(), entry.base)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let mut config = SentinelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.self_healing.mode, HealingMode::Disabled);
        let threshold_delta =
            (config.self_healing.confidence_threshold - DEFAULT_CONFIDENCE_THRESHOLD).abs();
        assert!(threshold_delta < f64::EPSILON);
    }

    #[test]
    fn impact_weights_must_sum_to_one() {
        let weights =
            ImpactWeightsConfig { data: 0.5, pipeline: 0.5, business: 0.5, resource: 0.5 };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn impact_thresholds_must_be_ascending() {
        let thresholds = ImpactThresholdsConfig { medium: 0.6, high: 0.3, critical: 0.8 };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn zero_max_concurrent_alerts_is_invalid() {
        let config = AlertingConfig { rules: Vec::new(), max_concurrent_alerts: 0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_escalation_policy_severities_are_invalid() {
        let config = EscalationConfig {
            check_interval_seconds: 60,
            escalation_policies: vec![
                EscalationPolicyConfig {
                    severity: Severity::High,
                    levels: vec![1, 2],
                    timeframes: vec![],
                },
                EscalationPolicyConfig {
                    severity: Severity::High,
                    levels: vec![1],
                    timeframes: vec![],
                },
            ],
            escalation_targets: vec![],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_ascending_escalation_levels_are_invalid() {
        let policy = EscalationPolicyConfig {
            severity: Severity::Critical,
            levels: vec![2, 1],
            timeframes: vec![],
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn full_config_parses_from_toml() {
        let toml_text = r#"
            [self_healing]
            mode = "semi_automatic"
            confidence_threshold = 0.9

            [self_healing.impact_weights]
            data = 0.4
            pipeline = 0.3
            business = 0.2
            resource = 0.1

            [notifications.channels.teams]
            webhook_url = "https://example.com/webhook"

            [[notifications.routing_rules]]
            channels = ["TEAMS"]
            [[notifications.routing_rules.conditions]]
            type = "severity"
            severity = "CRITICAL"

            [[escalation.escalation_policies]]
            severity = "HIGH"
            levels = [1, 2, 3]
            timeframes = [{ level = 1, minutes = 15 }]
        "#;
        let mut config: SentinelConfig = toml::from_str(toml_text).expect("config should parse");
        config.validate().expect("config should validate");
        assert_eq!(config.self_healing.mode, HealingMode::SemiAutomatic);
        let teams_webhook =
            config.notifications.channels.teams.as_ref().map(|t| t.webhook_url.as_str());
        assert_eq!(teams_webhook, Some("https://example.com/webhook"));
        assert_eq!(config.escalation.escalation_policies.len(), 1);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("sentinel.toml");
        let oversized = "# ".to_string() + &"x".repeat(MAX_CONFIG_FILE_SIZE + 1);
        fs::write(&path, oversized).expect("write should succeed");
        let result = SentinelConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("does-not-exist.toml");
        let result = SentinelConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
