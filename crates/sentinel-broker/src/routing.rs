// crates/sentinel-broker/src/routing.rs
// ============================================================================
// Module: Channel Resolution
// Description: Decides which channels a message is sent on.
// Purpose: Implement the three-tier resolution order from the routing spec.
// Dependencies: sentinel-core::model
// ============================================================================

//! ## Overview
//! [`resolve_channels`] implements the resolution order: an explicit channel
//! set wins outright; otherwise every matching [`RoutingRule`] contributes
//! its channels (union, not first-match — see `DESIGN.md`'s resolved Open
//! Question on this point); otherwise a severity-keyed fallback table,
//! which a config-supplied per-`alert_type` override replaces wholesale.

use std::collections::BTreeSet;
use std::collections::HashMap;

use sentinel_core::Channel;
use sentinel_core::Severity;
use serde_json::Value;

/// One condition a [`RoutingRule`] must match against a message field.
#[derive(Debug, Clone)]
pub enum RuleCondition {
    /// Field must equal this severity exactly.
    Severity(Severity),
    /// Field must equal this JSON value exactly (string/number/bool fields
    /// such as `alert_type` or a context key).
    Equals { field: String, value: Value },
}

/// A routing rule: every condition must hold for its channels to apply.
#[derive(Debug, Clone, Default)]
pub struct RoutingRule {
    /// Conditions that must all hold for this rule to match.
    pub conditions: Vec<RuleCondition>,
    /// Channels contributed when this rule matches.
    pub channels: BTreeSet<Channel>,
}

/// The fields a message exposes to routing-rule condition matching.
#[derive(Debug, Clone, Copy)]
pub struct RoutingFields<'a> {
    /// The alert's severity.
    pub severity: Severity,
    /// The alert's type tag.
    pub alert_type: &'a str,
    /// The alert's context map, for arbitrary-field rule conditions.
    pub context: &'a std::collections::BTreeMap<String, Value>,
}

impl RuleCondition {
    fn matches(&self, fields: RoutingFields<'_>) -> bool {
        match self {
            Self::Severity(expected) => fields.severity == *expected,
            Self::Equals { field, value } => match field.as_str() {
                "alert_type" => fields.context.get(field).map_or_else(
                    || Value::String(fields.alert_type.to_string()) == *value,
                    |actual| actual == value,
                ),
                _ => fields.context.get(field) == Some(value),
            },
        }
    }
}

impl RoutingRule {
    fn matches(&self, fields: RoutingFields<'_>) -> bool {
        self.conditions.iter().all(|condition| condition.matches(fields))
    }
}

/// Severity-keyed fallback channel sets, overridable per `alert_type`.
#[derive(Debug, Clone)]
pub struct FallbackChannels {
    defaults: HashMap<Severity, BTreeSet<Channel>>,
    per_alert_type: HashMap<String, BTreeSet<Channel>>,
}

impl Default for FallbackChannels {
    fn default() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(Severity::Critical, BTreeSet::from([Channel::Teams, Channel::Email]));
        defaults.insert(Severity::High, BTreeSet::from([Channel::Teams, Channel::Email]));
        defaults.insert(Severity::Medium, BTreeSet::from([Channel::Teams]));
        defaults.insert(Severity::Low, BTreeSet::from([Channel::Teams]));
        defaults.insert(Severity::Info, BTreeSet::from([Channel::Teams]));
        Self { defaults, per_alert_type: HashMap::new() }
    }
}

impl FallbackChannels {
    /// Registers a per-`alert_type` override that replaces the severity
    /// default entirely when that alert type is routed.
    pub fn set_override(&mut self, alert_type: impl Into<String>, channels: BTreeSet<Channel>) {
        self.per_alert_type.insert(alert_type.into(), channels);
    }

    fn resolve(&self, fields: RoutingFields<'_>) -> BTreeSet<Channel> {
        self.per_alert_type
            .get(fields.alert_type)
            .cloned()
            .or_else(|| self.defaults.get(&fields.severity).cloned())
            .unwrap_or_default()
    }
}

/// Resolves the effective channel set for one message, per the three-tier
/// order: explicit, then routing-rule union, then severity fallback.
#[must_use]
pub fn resolve_channels(
    explicit: Option<&BTreeSet<Channel>>,
    rules: &[RoutingRule],
    fallback: &FallbackChannels,
    fields: RoutingFields<'_>,
) -> BTreeSet<Channel> {
    if let Some(explicit) = explicit {
        return explicit.clone();
    }

    let matched: BTreeSet<Channel> = rules
        .iter()
        .filter(|rule| rule.matches(fields))
        .flat_map(|rule| rule.channels.iter().copied())
        .collect();
    if !matched.is_empty() {
        return matched;
    }

    fallback.resolve(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(
        severity: Severity,
        alert_type: &'a str,
        context: &'a std::collections::BTreeMap<String, Value>,
    ) -> RoutingFields<'a> {
        RoutingFields { severity, alert_type, context }
    }

    #[test]
    fn explicit_channels_win_outright() {
        let explicit = BTreeSet::from([Channel::Email]);
        let context = std::collections::BTreeMap::new();
        let resolved = resolve_channels(
            Some(&explicit),
            &[RoutingRule { conditions: vec![], channels: BTreeSet::from([Channel::Teams]) }],
            &FallbackChannels::default(),
            fields(Severity::Critical, "pipeline_failure", &context),
        );
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn routing_rules_union_rather_than_first_match() {
        let context = std::collections::BTreeMap::new();
        let rules = vec![
            RoutingRule {
                conditions: vec![RuleCondition::Severity(Severity::High)],
                channels: BTreeSet::from([Channel::Teams]),
            },
            RoutingRule {
                conditions: vec![RuleCondition::Equals {
                    field: "alert_type".to_string(),
                    value: Value::String("quality_issue".to_string()),
                }],
                channels: BTreeSet::from([Channel::Email]),
            },
        ];
        let resolved = resolve_channels(
            None,
            &rules,
            &FallbackChannels::default(),
            fields(Severity::High, "quality_issue", &context),
        );
        assert_eq!(resolved, BTreeSet::from([Channel::Teams, Channel::Email]));
    }

    #[test]
    fn severity_fallback_applies_when_nothing_else_matches() {
        let context = std::collections::BTreeMap::new();
        let resolved = resolve_channels(
            None,
            &[],
            &FallbackChannels::default(),
            fields(Severity::Medium, "x", &context),
        );
        assert_eq!(resolved, BTreeSet::from([Channel::Teams]));
    }

    #[test]
    fn per_alert_type_override_replaces_default_entirely() {
        let mut fallback = FallbackChannels::default();
        fallback.set_override("quiet_type", BTreeSet::new());
        let context = std::collections::BTreeMap::new();
        let resolved = resolve_channels(
            None,
            &[],
            &fallback,
            fields(Severity::Critical, "quiet_type", &context),
        );
        assert!(resolved.is_empty());
    }
}
